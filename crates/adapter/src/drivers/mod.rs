pub mod antispam;
pub mod ip_region;
pub mod notify;
pub mod page_fetch;
