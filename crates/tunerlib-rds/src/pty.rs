//! Program type (PTY) code lookup.
//!
//! The 5-bit PTY code carried in every RDS group maps to a genre name,
//! but the mapping differs between the European RDS standard and the
//! North American RBDS standard. Code 0 is "no programme type" in both
//! and resolves to an empty string, as do the RBDS unassigned slots.

const EU: [&str; 32] = [
    "",
    "News",
    "Current affairs",
    "Information",
    "Sport",
    "Education",
    "Drama",
    "Culture",
    "Science",
    "Varied",
    "Pop music",
    "Rock music",
    "Easy listening",
    "Light classical",
    "Serious classical",
    "Other music",
    "Weather",
    "Finance",
    "Children's programmes",
    "Social affairs",
    "Religion",
    "Phone-in",
    "Travel",
    "Leisure",
    "Jazz music",
    "Country music",
    "National music",
    "Oldies music",
    "Folk music",
    "Documentary",
    "Alarm test",
    "Alarm",
];

const NORTH_AMERICA: [&str; 32] = [
    "",
    "News",
    "Information",
    "Sports",
    "Talk",
    "Rock",
    "Classic rock",
    "Adult hits",
    "Soft rock",
    "Top 40",
    "Country",
    "Oldies",
    "Soft",
    "Nostalgia",
    "Jazz",
    "Classical",
    "Rhythm and blues",
    "Soft rhythm and blues",
    "Language",
    "Religious music",
    "Religious talk",
    "Personality",
    "Public",
    "College",
    "Spanish talk",
    "Spanish music",
    "Hip hop",
    "",
    "",
    "Weather",
    "Emergency test",
    "Emergency",
];

/// Name for a PTY code under the European RDS standard.
///
/// Returns an empty string for code 0 and out-of-range codes.
pub fn program_type_name_eu(pty: u8) -> &'static str {
    EU.get(pty as usize).copied().unwrap_or("")
}

/// Name for a PTY code under the North American RBDS standard.
///
/// Returns an empty string for code 0, unassigned codes, and
/// out-of-range codes.
pub fn program_type_name_na(pty: u8) -> &'static str {
    NORTH_AMERICA.get(pty as usize).copied().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes() {
        assert_eq!(program_type_name_eu(1), "News");
        assert_eq!(program_type_name_na(1), "News");
        assert_eq!(program_type_name_eu(10), "Pop music");
        assert_eq!(program_type_name_na(10), "Country");
        assert_eq!(program_type_name_eu(31), "Alarm");
        assert_eq!(program_type_name_na(31), "Emergency");
    }

    #[test]
    fn unassigned_and_out_of_range_are_empty() {
        assert_eq!(program_type_name_eu(0), "");
        assert_eq!(program_type_name_na(27), "");
        assert_eq!(program_type_name_na(28), "");
        assert_eq!(program_type_name_eu(32), "");
        assert_eq!(program_type_name_na(200), "");
    }
}
