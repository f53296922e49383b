/// Tests for console formatting module
///
/// Previews are rendered into a buffer at a fixed width so the output is
/// reproducible.

#[cfg(test)]
mod tests {
    use crate::console_format::*;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter().map(|r| r.iter().map(|c| c.to_string()).collect()).collect()
    }

    fn render(rows: &[Vec<String>], max_rows: usize, width: usize) -> String {
        let mut buf = Vec::new();
        TableWriter::new(&mut buf, width).write_preview("grade_report", rows, max_rows).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_display_width_unicode() {
        assert_eq!(display_width("hello"), 5);
        assert_eq!(display_width("│"), 1);
        assert_eq!(display_width("📦"), 2);
    }

    #[test]
    fn test_truncate_with_padding() {
        assert_eq!(truncate_with_padding("hi", 5), "hi   ");
        assert_eq!(truncate_with_padding("hello", 5), "hello");
        assert_eq!(truncate_with_padding("hello world", 8), "hello...");
        assert_eq!(display_width(&truncate_with_padding("test 📦 box", 10)), 10);
    }

    #[test]
    fn test_preview_layout() {
        let table = rows(&[&["Student ID", "Grade"], &["1", "0.5"]]);

        let out = render(&table, 10, 120);

        let expected = "grade_report (1 rows)\n\
                        ┌────────────┬───────┐\n\
                        │ Student ID │ Grade │\n\
                        ├────────────┼───────┤\n\
                        │ 1          │ 0.5   │\n\
                        └────────────┴───────┘\n";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_preview_limits_rows() {
        let table = rows(&[&["Username"], &["a"], &["b"], &["c"]]);

        let out = render(&table, 1, 120);

        assert!(out.contains("│ a        │"));
        assert!(!out.contains("│ b"));
        assert!(out.ends_with("... 2 more rows\n"));
    }

    #[test]
    fn test_column_widths_shrink_to_terminal() {
        let header = vec!["Homework 1: Introduction to Everything".to_string(), "Grade".to_string()];

        let widths = column_widths(&header, &[], 30);

        // 2 columns cost 7 border characters
        assert_eq!(widths.iter().sum::<usize>(), 23);
        assert_eq!(widths[1], 5);
    }

    #[test]
    fn test_column_widths_stop_at_minimum() {
        let header: Vec<String> = (0..10).map(|i| format!("Column number {}", i)).collect();

        let widths = column_widths(&header, &[], 20);

        assert!(widths.iter().all(|w| *w == MIN_COLUMN_WIDTH));
    }

    #[test]
    fn test_empty_table_renders_nothing() {
        assert_eq!(render(&[], 5, 80), "");
    }
}
