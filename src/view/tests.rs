//! Tests for the template renderer

use super::*;
use crate::models::{Paged, Pagination};
use crate::session::Flash;
use serde_json::json;
use std::fs;
use tempfile::TempDir;

fn staff() -> SystemAccount {
    SystemAccount {
        account_id: 2,
        account_name: "Tran Thi B".to_string(),
        account_email: "b@fu.edu.vn".to_string(),
        account_role: AccountRole::Staff,
    }
}

#[test]
fn test_embedded_templates_load() {
    let renderer = Renderer::new().unwrap();
    for name in [
        "base.html",
        "home.html",
        "article.html",
        "category.html",
        "login.html",
        "error.html",
        "confirm_delete.html",
        "admin/articles.html",
        "admin/article_form.html",
        "admin/categories.html",
        "admin/category_form.html",
        "admin/tags.html",
        "admin/tag_form.html",
        "admin/accounts.html",
        "admin/account_form.html",
        "admin/trash.html",
        "partials/pagination.html",
    ] {
        assert!(renderer.has_template(name), "missing {}", name);
    }
}

#[test]
fn test_missing_template() {
    let renderer = Renderer::new().unwrap();
    let err = renderer.render("nope.html", &Context::new()).unwrap_err();
    assert!(matches!(err, ViewError::NotFound(_)));
}

#[test]
fn test_error_page_has_retry_link() {
    let renderer = Renderer::new().unwrap();
    let mut context = Context::new();
    context.insert("status", &502);
    context.insert("message", "The news service is unreachable");
    context.insert("retry", "/admin/tags?page=2");

    let html = renderer
        .render_page("error.html", &context, &PageVars::new("FU News", "/admin/tags"))
        .unwrap();

    assert!(html.contains("The news service is unreachable"));
    // Autoescape also encodes '/'
    assert!(html.contains(r#"href="&#x2F;admin&#x2F;tags?page=2""#));
    assert!(html.contains("Retry"));
}

#[test]
fn test_page_vars_show_account_and_flash() {
    let renderer = Renderer::new().unwrap();
    let mut context = Context::new();
    context.insert("q", "");
    let articles: Paged<serde_json::Value> = Paged::new(vec![], Pagination::request(1, 12));
    context.insert("articles", &articles);
    context.insert("pagination", &articles.pagination);
    context.insert("pager_url", "/?page=");
    context.insert("categories", &Vec::<serde_json::Value>::new());

    let vars = PageVars::new("FU News", "/")
        .with_account(Some(staff()))
        .with_flash(Some(Flash::success("Article created")));
    let html = renderer.render_page("home.html", &context, &vars).unwrap();

    assert!(html.contains("Tran Thi B (Staff)"));
    assert!(html.contains("flash-success"));
    assert!(html.contains("Article created"));
    assert!(html.contains(r#"href="/admin/articles""#));
    assert!(!html.contains(r#"href="/admin/accounts""#));
    assert!(html.contains("No news found."));
}

#[test]
fn test_output_is_escaped() {
    let renderer = Renderer::new().unwrap();
    let mut context = Context::new();
    context.insert("status", &400);
    context.insert("message", "<script>x</script>");
    context.insert("retry", "/");

    let html = renderer
        .render_page("error.html", &context, &PageVars::new("FU News", "/"))
        .unwrap();
    assert!(!html.contains("<script>x"));
}

#[test]
fn test_pagination_partial() {
    let renderer = Renderer::new().unwrap();
    let mut context = Context::new();
    context.insert("pagination", &Pagination::new(2, 12, 25));
    context.insert("pager_url", "/?q=exam&page=");

    let html = renderer.render("partials/pagination.html", &context).unwrap();
    assert!(html.contains(r#"href="&#x2F;?q=exam&amp;page=1""#));
    assert!(html.contains(r#"href="&#x2F;?q=exam&amp;page=3""#));
    assert!(html.contains("<strong>2</strong>"));
}

#[test]
fn test_role_and_status_filters() {
    let empty = HashMap::new();
    assert_eq!(role_name_filter(&json!(3), &empty).unwrap(), json!("Admin"));
    assert_eq!(role_name_filter(&json!("staff"), &empty).unwrap(), json!("Staff"));
    assert_eq!(role_name_filter(&json!(9), &empty).unwrap(), json!("Unknown"));

    assert_eq!(status_label_filter(&json!(1), &empty).unwrap(), json!("Active"));
    assert_eq!(status_label_filter(&json!(false), &empty).unwrap(), json!("Inactive"));
    assert_eq!(status_label_filter(&json!(null), &empty).unwrap(), json!("Unknown"));
}

#[test]
fn test_overrides_replace_embedded_templates() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("error.html"),
        "custom {{ status }} {{ site_name }}",
    )
    .unwrap();
    fs::create_dir_all(temp_dir.path().join("admin")).unwrap();
    fs::write(temp_dir.path().join("admin/tags.html"), "tags override").unwrap();
    fs::write(temp_dir.path().join("notes.txt"), "ignored").unwrap();

    let renderer = Renderer::with_overrides(temp_dir.path()).unwrap();
    let mut context = Context::new();
    context.insert("status", &404);

    let html = renderer
        .render_page("error.html", &context, &PageVars::new("Campus", "/x"))
        .unwrap();
    assert_eq!(html, "custom 404 Campus");
    assert_eq!(renderer.render("admin/tags.html", &Context::new()).unwrap(), "tags override");
    assert!(renderer.has_template("home.html"));
    assert!(!renderer.has_template("notes.txt"));
}

#[test]
fn test_broken_override_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("error.html"), "{% if %}").unwrap();

    let err = Renderer::with_overrides(temp_dir.path()).unwrap_err();
    assert!(matches!(err, ViewError::TemplateError(_)));
}
