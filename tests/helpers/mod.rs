#![allow(dead_code)]
pub mod fake_channel;
pub mod fake_mail;
pub mod fixtures;
