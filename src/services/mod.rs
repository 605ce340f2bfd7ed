pub(crate) mod carry_forward;
pub(crate) mod class_resolver;
pub(crate) mod exam_schedule;
pub(crate) mod results;
pub(crate) mod score_entry;
pub(crate) mod scoring;
