use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime,
    PrimitiveDateTime,
};

pub(crate) fn primitive_now_utc() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

pub(crate) fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

pub(crate) fn format_primitive(value: PrimitiveDateTime) -> String {
    value.assume_utc().format(&Rfc3339).unwrap_or_else(|_| value.assume_utc().to_string())
}

/// `YYYY-MM-DD`, the shape exam dates travel in over the API.
pub(crate) fn format_date(value: Date) -> String {
    value
        .format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| value.to_string())
}

pub(crate) fn parse_date(value: &str) -> Option<Date> {
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]")).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Month, Time};

    #[test]
    fn format_primitive_outputs_utc_z() {
        let date = Date::from_calendar_date(2025, Month::January, 2).unwrap();
        let value = PrimitiveDateTime::new(date, Time::from_hms(10, 20, 30).unwrap());
        assert_eq!(format_primitive(value), "2025-01-02T10:20:30Z");
    }

    #[test]
    fn dates_parse_and_format() {
        let date = parse_date(" 2024-09-16 ").expect("date");
        assert_eq!(date, Date::from_calendar_date(2024, Month::September, 16).unwrap());
        assert_eq!(format_date(date), "2024-09-16");
        assert!(parse_date("16/09/2024").is_none());
    }
}
