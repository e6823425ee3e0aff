//! Large tables: Slack chunking and CSV detachment.

mod helpers;

use alert_msgs::notification::email::detach_oversized_tables;
use alert_msgs::{render_html, AlertError, Component, Table};
use helpers::fixtures::{host_table, outage_report};

#[test]
fn test_slack_blocks_per_row_count() {
    for (rows, blocks) in [(1, 1), (13, 1), (14, 2), (26, 2), (27, 3), (40, 4)] {
        let md = host_table(rows).slack_md();
        assert_eq!(md.matches("```").count(), 2 * blocks, "{rows} rows");
    }
}

#[test]
fn test_slack_chunking_does_not_mutate_the_table() {
    let table = host_table(30);
    let first = table.slack_md();
    assert_eq!(table.rows().len(), 30);
    assert_eq!(table.slack_md(), first);
}

#[test]
fn test_detached_csv_round_trips() {
    let mut table = host_table(5);
    let (filename, bytes) = table.detach_rows_as_file().unwrap();
    assert!(filename.starts_with("Host_status_"));
    assert!(filename.ends_with(".csv"));

    let mut reader = csv::Reader::from_reader(bytes.as_slice());
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.iter().collect::<Vec<_>>(), ["id", "host", "status"]);

    let records: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(records.len(), 5);
    assert_eq!(&records[3][1], "web-03");
    assert_eq!(&records[3][2], "down");
}

#[test]
fn test_detached_table_renders_reference_instead_of_rows() {
    let mut table = host_table(3);
    let (filename, _) = table.detach_rows_as_file().unwrap();
    assert!(table.rows().is_empty());
    assert!(table.rows_detached());

    let html = render_html(table.clone()).unwrap();
    assert!(!html.contains("<table"));
    assert!(html.contains(&filename));
    assert!(html.contains("Attachment: "));
    for host in ["web-00", "web-01", "web-02"] {
        assert!(!html.contains(host), "row value {host} leaked into the body");
    }

    assert!(!table.slack_md().contains("web-01"));
    assert!(!table.slack_md().contains("```"));
    assert!(table.slack_md().contains(&format!("*Attachment:* {filename}")));
}

#[test]
fn test_second_detach_is_rejected() {
    let mut table = host_table(2);
    let (filename, _) = table.detach_rows_as_file().unwrap();
    match table.detach_rows_as_file() {
        Err(AlertError::AlreadyDetached(name)) => assert_eq!(name, filename),
        other => panic!("expected AlreadyDetached, got {other:?}"),
    }
}

#[test]
fn test_filename_identifies_row_content() {
    let (same_a, _) = host_table(4).detach_rows_as_file().unwrap();
    let (same_b, _) = host_table(4).detach_rows_as_file().unwrap();
    let (different, _) = host_table(5).detach_rows_as_file().unwrap();
    assert_eq!(same_a, same_b);
    assert_ne!(same_a, different);
}

#[test]
fn test_untitled_and_long_titles() {
    let (untitled, _) = Table::new(vec![vec![("a", "1")]])
        .detach_rows_as_file()
        .unwrap();
    assert!(untitled.starts_with("table_"));

    let long_title = "x".repeat(80);
    let (long, _) = Table::new(vec![vec![("a", "1")]])
        .with_title(&long_title)
        .detach_rows_as_file()
        .unwrap();
    assert!(long.starts_with(&format!("{}_", "x".repeat(50))));
    assert!(!long.starts_with(&"x".repeat(51)));
}

#[test]
fn test_email_overflow_keeps_small_tables_inline() {
    let mut components = outage_report(12);
    components.push(host_table(4).into());

    let attachments = detach_oversized_tables(&mut components, 10).unwrap();
    assert_eq!(attachments.len(), 1);

    let html = render_html(components.clone()).unwrap();
    assert_eq!(html.matches("<table").count(), 1);
    assert!(html.contains(&attachments[0].filename));

    let detached: Vec<bool> = components
        .iter()
        .filter_map(|c| match c {
            Component::Table(t) => Some(t.rows_detached()),
            _ => None,
        })
        .collect();
    assert_eq!(detached, [true, false]);
}
