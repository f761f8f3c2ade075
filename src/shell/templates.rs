use askama::Template;

use crate::services::ServiceEntry;

/// One service button on the home screen
#[derive(Debug, Clone)]
pub struct ServiceRow {
    pub id: u32,
    pub name: String,
    pub enabled: bool,
}

impl From<&ServiceEntry> for ServiceRow {
    fn from(entry: &ServiceEntry) -> Self {
        Self {
            id: entry.service_id,
            name: entry.service_name.clone(),
            enabled: entry.enabled,
        }
    }
}

#[derive(Template)]
#[template(path = "home.txt")]
pub struct HomeTemplate {
    pub authenticated: bool,
    pub nickname: Option<String>,
    pub services: Vec<ServiceRow>,
}

#[derive(Template)]
#[template(path = "screen.txt")]
pub struct ScreenTemplate {
    pub title: &'static str,
    pub description: &'static str,
    pub link: String,
}
