use sqlx::PgPool;
use thiserror::Error;

use crate::db::models::Class;
use crate::repositories;

/// How a request names its class.
#[derive(Debug, Clone, Copy)]
pub(crate) enum ClassSelector<'a> {
    Id(&'a str),
    Name { name: &'a str, section: Option<&'a str> },
}

impl<'a> ClassSelector<'a> {
    /// Prefers a non-blank `class_id`; otherwise falls back to the name.
    pub(crate) fn from_request(
        class_id: Option<&'a str>,
        class_name: Option<&'a str>,
        section: Option<&'a str>,
    ) -> Option<Self> {
        if let Some(id) = class_id.map(str::trim).filter(|id| !id.is_empty()) {
            return Some(Self::Id(id));
        }

        let name = class_name.map(str::trim).filter(|name| !name.is_empty())?;
        let section = section.map(str::trim).filter(|section| !section.is_empty());
        Some(Self::Name { name, section })
    }
}

#[derive(Debug, Error)]
pub(crate) enum ResolveError {
    #[error("Class not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] sqlx::Error),
}

/// Text a class is matched against: the name, with the section appended when it was
/// sent separately.
pub(crate) fn lookup_text(name: &str, section: Option<&str>) -> String {
    match section {
        Some(section) if !name.to_lowercase().ends_with(&section.to_lowercase()) => {
            format!("{name} {section}")
        }
        _ => name.to_string(),
    }
}

fn labels(class: &Class) -> [String; 2] {
    [class.label(), class.name.trim().to_string()]
}

/// Picks one class out of the name-match candidates.
///
/// An exact "name section" or bare-name match wins, then the same comparison ignoring
/// case, and otherwise the first candidate. Candidates arrive ordered oldest first, so
/// the fallback is stable across calls.
pub(crate) fn pick_class<'c>(candidates: &'c [Class], lookup: &str) -> Option<&'c Class> {
    let lookup = lookup.trim();

    for label_index in 0..2 {
        if let Some(class) =
            candidates.iter().find(|class| labels(class)[label_index] == lookup)
        {
            return Some(class);
        }
    }

    let lowered = lookup.to_lowercase();
    for label_index in 0..2 {
        if let Some(class) =
            candidates.iter().find(|class| labels(class)[label_index].to_lowercase() == lowered)
        {
            return Some(class);
        }
    }

    candidates.first()
}

/// Resolves a selector to a canonical class id.
///
/// An explicit id is returned unchanged once it is known to exist.
pub(crate) async fn resolve(
    pool: &PgPool,
    selector: ClassSelector<'_>,
) -> Result<String, ResolveError> {
    let (name, section) = match selector {
        ClassSelector::Id(id) => {
            return match repositories::classes::find_by_id(pool, id).await? {
                Some(class) => Ok(class.id),
                None => Err(ResolveError::NotFound(id.to_string())),
            };
        }
        ClassSelector::Name { name, section } => (name, section),
    };

    let lookup = lookup_text(name, section);
    let candidates = repositories::classes::find_candidates_by_name(pool, &lookup).await?;

    let class = pick_class(&candidates, &lookup)
        .ok_or_else(|| ResolveError::NotFound(lookup.clone()))?;

    if candidates.len() > 1 {
        tracing::debug!(
            lookup = %lookup,
            candidates = candidates.len(),
            class_id = %class.id,
            "Disambiguated class name"
        );
    }

    Ok(class.id.clone())
}
