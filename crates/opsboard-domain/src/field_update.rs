use serde::{Deserialize, Deserializer};

/// Three-state partial update for an optional field.
///
/// Request bodies distinguish "key absent" from "key set to null": with
/// `#[serde(default)]` on the containing field an absent key yields
/// `NoChange`, `null` yields `Clear` and any value yields `Set`.
///
/// ```
/// use opsboard_domain::FieldUpdate;
///
/// let mut field = Some("old".to_string());
/// FieldUpdate::Set("new".to_string()).apply_to(&mut field);
/// assert_eq!(field.as_deref(), Some("new"));
///
/// FieldUpdate::<String>::Clear.apply_to(&mut field);
/// assert_eq!(field, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldUpdate<T> {
    #[default]
    NoChange,
    Set(T),
    Clear,
}

impl<T> FieldUpdate<T> {
    pub fn apply_to(self, field: &mut Option<T>) {
        match self {
            FieldUpdate::NoChange => {}
            FieldUpdate::Set(value) => *field = Some(value),
            FieldUpdate::Clear => *field = None,
        }
    }

    pub fn is_change(&self) -> bool {
        !matches!(self, FieldUpdate::NoChange)
    }

    pub fn as_set(&self) -> Option<&T> {
        match self {
            FieldUpdate::Set(value) => Some(value),
            _ => None,
        }
    }
}

impl<T> From<Option<T>> for FieldUpdate<T> {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(value) => FieldUpdate::Set(value),
            None => FieldUpdate::Clear,
        }
    }
}

impl<'de, T> Deserialize<'de> for FieldUpdate<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(FieldUpdate::from)
    }
}
