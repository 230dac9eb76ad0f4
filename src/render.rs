//! Template engine setup and page rendering. The authenticated user is
//! injected into every template context.

use crate::error::AppError;
use crate::models::User;
use crate::reply::Reply;
use crate::schema::now_epoch;
use std::collections::HashMap;
use tera::{Context, Tera, Value};

pub fn engine(templates_dir: &str) -> Result<Tera, AppError> {
    let mut tera = Tera::new(&format!("{}/**/*.html", templates_dir))?;
    tera.register_filter("datetime", datetime_filter);
    Ok(tera)
}

fn datetime_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let t = value.as_f64().unwrap_or(0.0);
    Ok(Value::String(format_age(t, now_epoch())))
}

/// Human-readable age of an epoch-seconds timestamp.
pub fn format_age(t: f64, now: f64) -> String {
    let delta = (now - t).max(0.0) as i64;
    if delta < 60 {
        return "1 minute ago".to_string();
    }
    if delta < 60 * 60 {
        return format!("{} minutes ago", delta / 60);
    }
    if delta < 60 * 60 * 24 {
        return format!("{} hours ago", delta / (60 * 60));
    }
    if delta < 60 * 60 * 24 * 365 {
        return format!("{} days ago", delta / (60 * 60 * 24));
    }
    match chrono::DateTime::from_timestamp(t as i64, 0) {
        Some(dt) => dt.format("%B %-d, %Y").to_string(),
        None => "a long time ago".to_string(),
    }
}

/// Render a named template with the given context, adding the current
/// authenticated user as `user`.
pub fn page(
    tera: &Tera,
    name: &str,
    mut ctx: Context,
    user: Option<&User>,
) -> Result<Reply, AppError> {
    ctx.insert("user", &user);
    Ok(Reply::Html(tera.render(name, &ctx)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_tiers_match_scale() {
        let now = 1_700_000_000.0;
        assert_eq!(format_age(now - 30.0, now), "1 minute ago");
        assert_eq!(format_age(now - 180.0, now), "3 minutes ago");
        assert_eq!(format_age(now - 7200.0, now), "2 hours ago");
        assert_eq!(format_age(now - 172_800.0, now), "2 days ago");
        assert!(format_age(now - 94_608_000.0, now).contains("20"));
    }
}
