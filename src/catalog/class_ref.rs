use crate::error::{Error, Result};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Addresses a class either by catalog index or by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClassRef {
    Id(usize),
    Name(String),
}

impl ClassRef {
    /// Builds a reference from an optional id and an optional name.
    ///
    /// The name takes precedence when both are given; giving neither is an error.
    pub fn from_parts(class_id: Option<usize>, class_name: Option<&str>) -> Result<Self> {
        match (class_id, class_name) {
            (_, Some(name)) => Ok(ClassRef::Name(name.to_string())),
            (Some(id), None) => Ok(ClassRef::Id(id)),
            (None, None) => Err(Error::InvalidArgument(
                "either class_id or class_name must be given".to_string(),
            )),
        }
    }
}

impl From<usize> for ClassRef {
    fn from(id: usize) -> Self {
        ClassRef::Id(id)
    }
}

impl From<&str> for ClassRef {
    fn from(name: &str) -> Self {
        ClassRef::Name(name.to_string())
    }
}

impl From<String> for ClassRef {
    fn from(name: String) -> Self {
        ClassRef::Name(name)
    }
}

impl From<&ClassRef> for ClassRef {
    fn from(class: &ClassRef) -> Self {
        class.clone()
    }
}

/// All-digit input is an id, anything else a name.
impl FromStr for ClassRef {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.parse::<usize>() {
            Ok(id) if s.bytes().all(|b| b.is_ascii_digit()) => ClassRef::Id(id),
            _ => ClassRef::Name(s.to_string()),
        })
    }
}

impl fmt::Display for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassRef::Id(id) => write!(f, "#{}", id),
            ClassRef::Name(name) => f.write_str(name),
        }
    }
}
