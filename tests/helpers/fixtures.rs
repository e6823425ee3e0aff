#![allow(dead_code)]
//! Sample alert content shared by the integration tests.

use alert_msgs::config::{Config, EmailConfig};
use alert_msgs::{Component, ContentType, FontSize, KeyValueMap, Table, Text};

/// A table with `n` rows of `id`, `host` and `status` columns.
pub fn host_table(n: usize) -> Table {
    Table::new((0..n).map(|i| {
        vec![
            ("id", i.to_string()),
            ("host", format!("web-{i:02}")),
            ("status", if i % 2 == 0 { "up" } else { "down" }.to_string()),
        ]
    }))
    .with_title("Host status")
}

pub fn outage_report(rows: usize) -> Vec<Component> {
    vec![
        Text::styled("Database outage", ContentType::Error, FontSize::Large).into(),
        KeyValueMap::new([("region", "eu-west-1"), ("since", "03:12 UTC")]).into(),
        host_table(rows).into(),
    ]
}

pub fn email_config() -> Config {
    Config {
        email: EmailConfig {
            addr: Some("alerts@example.com".into()),
            password: Some("app-password".into()),
            receiver_addr: Some("oncall@example.com".into()),
            retries: 1,
            max_inline_table_rows: 10,
            ..Default::default()
        },
        ..Default::default()
    }
}
