//! Background automation driving live pages through a shared file store

use chrono::NaiveTime;
use serde_json::json;
use vibe_background::{
    CommandOutcome, FileStore, ScheduleOutcome, check_schedule, exclude_site, settings,
    toggle_global, toggle_site,
};
use vibe_dom::Document;
use vibe_theme::{
    ConfigStore, FLUSH_DELAY, ManualColorScheme, PageSession, StealthToken, StoreArea, StoreItems,
    keys,
};

fn temp_store() -> (tempfile::TempDir, FileStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path().join("vibe-store.json"));
    (dir, store)
}

fn open_page(store: &FileStore, url: &str) -> PageSession<FileStore, ManualColorScheme> {
    smol::block_on(PageSession::attach_with_token(
        Document::new(url),
        store.clone(),
        ManualColorScheme::new(false),
        StealthToken::from_raw("bg000000"),
    ))
}

fn at(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

#[test]
fn test_shortcut_toggles_open_page() {
    let (_dir, store) = temp_store();
    let mut page = open_page(&store, "https://a.com/");
    assert!(!page.controller().is_active());
    
    assert_eq!(smol::block_on(toggle_global(&store)).unwrap(), CommandOutcome::GlobalEnabled(true));
    page.pump();
    assert!(page.controller().is_active());
    
    smol::block_on(toggle_global(&store)).unwrap();
    page.pump();
    assert!(!page.controller().is_active());
}

#[test]
fn test_schedule_switches_open_page() {
    let (_dir, store) = temp_store();
    let mut sync = StoreItems::new();
    sync.insert(keys::AUTOMATION_MODE.into(), json!("scheduled"));
    sync.insert(keys::START_TIME.into(), json!("20:00"));
    sync.insert(keys::END_TIME.into(), json!("07:00"));
    smol::block_on(store.set(StoreArea::Sync, sync)).unwrap();
    
    let mut page = open_page(&store, "https://a.com/");
    assert_eq!(
        smol::block_on(check_schedule(&store, at(21, 0))).unwrap(),
        ScheduleOutcome::Switched(true),
    );
    page.pump();
    assert!(page.controller().is_active());
    
    assert_eq!(
        smol::block_on(check_schedule(&store, at(7, 0))).unwrap(),
        ScheduleOutcome::Switched(false),
    );
    page.pump();
    assert!(!page.controller().is_active());
}

#[test]
fn test_context_menu_excludes_current_site() {
    let (_dir, store) = temp_store();
    smol::block_on(toggle_global(&store)).unwrap();
    let mut page = open_page(&store, "https://shop.example.com/cart");
    let mut other = open_page(&store, "https://example.com/");
    assert!(page.controller().is_active());
    
    let outcome = smol::block_on(exclude_site(&store, "https://shop.example.com/item/4")).unwrap();
    assert_eq!(outcome, CommandOutcome::Excluded("shop.example.com".into()));
    page.pump();
    other.pump();
    assert!(!page.controller().is_active());
    assert!(other.controller().is_active());
    
    smol::block_on(toggle_site(&store, "https://shop.example.com/")).unwrap();
    page.pump();
    assert!(page.controller().is_active());
}

#[test]
fn test_import_reaches_open_page() {
    let (_dir, store) = temp_store();
    let scheme = ManualColorScheme::new(true);
    let mut page = smol::block_on(PageSession::attach(Document::new("https://a.com/"), store.clone(), scheme));
    assert!(!page.controller().is_active());
    
    smol::block_on(settings::import(&store, r#"{ "automationMode": "system" }"#)).unwrap();
    page.pump();
    assert!(page.controller().is_active());
}

#[test]
fn test_rendered_html_carries_theme() {
    let (_dir, store) = temp_store();
    smol::block_on(toggle_global(&store)).unwrap();
    let html = r#"<!DOCTYPE html><html><head><title>t</title></head>
        <body><div id="hero" style="background-image: url(hero.jpg)"></div><img src="a.png"></body></html>"#;
    let document = vibe_html::parse_document(html, "https://a.com/");
    let mut page = smol::block_on(PageSession::attach_with_token(
        document,
        store.clone(),
        ManualColorScheme::new(false),
        StealthToken::from_raw("render00"),
    ));
    page.advance(FLUSH_DELAY);
    
    let out = page.document().to_html();
    assert!(out.contains(r#"id="style-render00""#));
    assert!(out.contains("sepia(0)"));
    let hero = page.document().get_element_by_id("hero").unwrap();
    assert!(page.document().has_class(hero, "restore-render00"));
    assert!(page.document().outer_html(hero).contains("restore-render00"));
}
