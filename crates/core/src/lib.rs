#![forbid(unsafe_code)]

pub mod progression;
pub mod state;

pub mod ids {
    #[derive(Clone, Debug, PartialEq, Eq, Hash)]
    pub struct ProjectId(String);

    impl ProjectId {
        pub fn as_str(&self) -> &str {
            &self.0
        }

        pub fn try_new(value: impl Into<String>) -> Result<Self, ProjectIdError> {
            let value = value.into();
            validate_project_id(&value)?;
            Ok(Self(value))
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum ProjectIdError {
        Empty,
        TooLong,
        InvalidFirstChar,
        InvalidChar { ch: char, index: usize },
    }

    fn validate_project_id(value: &str) -> Result<(), ProjectIdError> {
        if value.is_empty() {
            return Err(ProjectIdError::Empty);
        }
        if value.len() > 128 {
            return Err(ProjectIdError::TooLong);
        }
        let mut chars = value.chars();
        let Some(first) = chars.next() else {
            return Err(ProjectIdError::Empty);
        };
        if !first.is_ascii_alphanumeric() {
            return Err(ProjectIdError::InvalidFirstChar);
        }
        for (index, ch) in value.chars().enumerate() {
            if index == 0 {
                continue;
            }
            if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '/' | '-') {
                continue;
            }
            return Err(ProjectIdError::InvalidChar { ch, index });
        }
        Ok(())
    }
}

pub mod policy {
    /// Which step states count as closing a phase. The source platform closed
    /// phases over skipped line items; some operators want strict completion.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub enum PhaseClosePolicy {
        CompletedOnly,
        #[default]
        CompletedOrSkipped,
    }

    impl PhaseClosePolicy {
        pub fn as_str(self) -> &'static str {
            match self {
                PhaseClosePolicy::CompletedOnly => "completed_only",
                PhaseClosePolicy::CompletedOrSkipped => "completed_or_skipped",
            }
        }

        pub fn parse(value: &str) -> Option<Self> {
            match value.trim() {
                "completed_only" => Some(PhaseClosePolicy::CompletedOnly),
                "completed_or_skipped" => Some(PhaseClosePolicy::CompletedOrSkipped),
                _ => None,
            }
        }
    }
}
