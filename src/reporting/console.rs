use std::fmt::Write;

use super::rows::{CumulativeRow, SessionRow};

const NAME_WIDTH: usize = 30;
const RULE_WIDTH: usize = 80;

fn rule() -> String {
    "-".repeat(RULE_WIDTH)
}

fn truncate_name(name: &str) -> String {
    name.chars().take(NAME_WIDTH).collect()
}

pub fn render_session_table(meeting_id: &str, session_label: &str, rows: &[SessionRow]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n===== CAMERA USAGE RESULTS (THIS SESSION) =====");
    let _ = writeln!(out, "Meeting ID: {}", meeting_id);
    let _ = writeln!(out, "Session Date: {}", session_label);
    let _ = writeln!(out, "Total Participants: {}", rows.len());
    let _ = writeln!(out, "{}", rule());
    let _ = writeln!(
        out,
        "{:<30} {:<15} {:<20}",
        "Participant Name", "Camera Off Time", "Percentage Off"
    );
    let _ = writeln!(out, "{}", rule());

    for row in rows {
        let _ = writeln!(
            out,
            "{:<30} {:>5.2} min     {:>6.2}%",
            truncate_name(&row.name),
            row.camera_off_minutes,
            row.percentage_off
        );
    }

    let _ = writeln!(out, "{}", rule());
    out
}

pub fn render_cumulative_table(meeting_id: &str, rows: &[CumulativeRow]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n===== CUMULATIVE CAMERA USAGE RESULTS =====");
    let _ = writeln!(out, "Meeting ID: {}", meeting_id);
    let _ = writeln!(out, "Total Tracked Participants: {}", rows.len());
    let _ = writeln!(out, "{}", rule());
    let _ = writeln!(
        out,
        "{:<30} {:<20} {:<20}",
        "Participant Name", "Total Camera Off Time", "Sessions Attended"
    );
    let _ = writeln!(out, "{}", rule());

    for row in rows {
        let _ = writeln!(
            out,
            "{:<30} {:>7.2} min     {:>3}",
            truncate_name(&row.name),
            row.camera_off_minutes,
            row.attended_sessions
        );
    }

    let _ = writeln!(out, "{}", rule());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_table_lines() {
        let rows = vec![SessionRow {
            name: "Alice".to_string(),
            camera_off_seconds: 30.0,
            camera_off_minutes: 0.5,
            percentage_off: 12.5,
            join_time: "2024-03-04 10:00:00".to_string(),
        }];
        let table = render_session_table("123", "2024-03-04 (Monday)", &rows);

        assert!(table.contains("===== CAMERA USAGE RESULTS (THIS SESSION) ====="));
        assert!(table.contains("Meeting ID: 123"));
        assert!(table.contains("Session Date: 2024-03-04 (Monday)"));
        assert!(table.contains("Total Participants: 1"));
        assert!(table.contains(&format!("{:<30}  0.50 min      12.50%", "Alice")));
    }

    #[test]
    fn test_cumulative_table_truncates_long_names() {
        let long_name = "A".repeat(45);
        let rows = vec![CumulativeRow {
            name: long_name.clone(),
            camera_off_seconds: 165.0,
            camera_off_minutes: 2.75,
            attended_sessions: 2,
        }];
        let table = render_cumulative_table("123", &rows);

        assert!(table.contains("Total Tracked Participants: 1"));
        assert!(!table.contains(&long_name));
        assert!(table.contains(&format!("{}    2.75 min       2", "A".repeat(30))));
    }
}
