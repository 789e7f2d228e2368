//! Dashboard sections.

/// The mutually exclusive dashboard sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Students,
    Teachers,
    /// Admin only.
    Assignments,
}

impl Tab {
    /// Every tab, in display order.
    pub const ALL: [Self; 3] = [Self::Students, Self::Teachers, Self::Assignments];

    /// Heading shown in the tab bar.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Students => "Students",
            Self::Teachers => "Teachers",
            Self::Assignments => "Assignments",
        }
    }

    /// Whether only administrators can open this tab.
    #[must_use]
    pub const fn is_admin_only(self) -> bool {
        matches!(self, Self::Assignments)
    }
}

impl std::fmt::Display for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Students => write!(f, "students"),
            Self::Teachers => write!(f, "teachers"),
            Self::Assignments => write!(f, "assignments"),
        }
    }
}

impl std::str::FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "students" => Ok(Self::Students),
            "teachers" => Ok(Self::Teachers),
            "assignments" => Ok(Self::Assignments),
            _ => Err(format!("invalid tab: {s}")),
        }
    }
}
