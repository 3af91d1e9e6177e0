//! Page shell: header, collapsible sidebar, main region, footer.
//!
//! The shell never fetches anything. It renders from whatever profile the
//! session gate already loaded for this request (see
//! [`SessionContext`](crate::session::SessionContext)).

pub mod html;
pub mod subscription;

use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::backend::UserProfile;
use crate::config::ShellConfig;
use crate::routes::{self, Namespace, Page};
use crate::session::SessionContext;
use html::escape;
use subscription::Countdown;

/// Who the page is rendered for.
#[derive(Debug, Clone, Copy)]
pub enum Viewer<'a> {
    /// Public pages (login).
    Anonymous,
    Session(&'a SessionContext),
    /// Demo namespace with a sample profile.
    Demo(&'a UserProfile),
}

impl<'a> Viewer<'a> {
    pub fn profile(self) -> Option<&'a UserProfile> {
        match self {
            Self::Anonymous => None,
            Self::Session(ctx) => ctx.profile(),
            Self::Demo(profile) => Some(profile),
        }
    }

    fn degraded_reason(self) -> Option<&'a str> {
        match self {
            Self::Session(ctx) => match &ctx.profile {
                crate::session::ProfileState::Unavailable { reason } => Some(reason.as_str()),
                crate::session::ProfileState::Loaded(_) => None,
            },
            _ => None,
        }
    }

    fn namespace(self) -> Namespace {
        match self {
            Self::Demo(_) => Namespace::Demo,
            _ => Namespace::Live,
        }
    }
}

/// Builder for one rendered page.
#[derive(Debug)]
pub struct PageShell<'a> {
    title: &'a str,
    subtitle: Option<&'a str>,
    show_sidebar: bool,
    viewer: Viewer<'a>,
    active: Option<Page>,
    /// Path of the page being rendered, when it is not `active`'s own path.
    location: Option<&'a str>,
    toast: Option<String>,
}

impl<'a> PageShell<'a> {
    pub fn new(title: &'a str, viewer: Viewer<'a>) -> Self {
        Self {
            title,
            subtitle: None,
            show_sidebar: true,
            viewer,
            active: None,
            location: None,
            toast: None,
        }
    }

    /// Shell for a routed page, titled after it.
    pub fn for_page(page: Page, viewer: Viewer<'a>) -> Self {
        let mut shell = Self::new(page.title(), viewer);
        shell.active = Some(page);
        shell
    }

    #[must_use]
    pub fn subtitle(mut self, subtitle: &'a str) -> Self {
        self.subtitle = Some(subtitle);
        self
    }

    /// Set the request path for a page below its section, such as a detail
    /// view. The retry banner links back to it.
    #[must_use]
    pub fn at(mut self, path: &'a str) -> Self {
        self.location = Some(path);
        self
    }

    /// Public and marketing pages render without navigation.
    #[must_use]
    pub fn without_sidebar(mut self) -> Self {
        self.show_sidebar = false;
        self
    }

    #[must_use]
    pub fn toast(mut self, message: impl Into<String>) -> Self {
        self.toast = Some(message.into());
        self
    }

    pub fn render(&self, content: &str, config: &ShellConfig, now: DateTime<Utc>) -> String {
        let title = escape(self.title);
        let subtitle = self
            .subtitle
            .map(|s| format!(r#"<p class="text-sm text-textMuted">{}</p>"#, escape(s)))
            .unwrap_or_default();
        let sidebar = if self.show_sidebar {
            self.sidebar(config, now)
        } else {
            String::new()
        };
        let banner = self.banner();
        let toast = self.toast.as_deref().map(html::toast).unwrap_or_default();
        let account = self.account();

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title} - Hospital Ops</title>
    <script defer src="/static/app.js"></script>
    <link rel="stylesheet" href="/static/app.css">
</head>
<body class="min-h-screen bg-background text-textPrimary antialiased">
    <div id="app-shell" class="flex flex-col min-h-screen">
        <header class="sticky top-0 z-50 w-full bg-surfaceContainer shadow-sm">
            <div class="container mx-auto flex h-14 items-center justify-between px-4">
                <div>
                    <h1 class="text-lg font-semibold">{title}</h1>
                    {subtitle}
                </div>
                {account}
            </div>
        </header>
        <div class="flex flex-1">
            {sidebar}
            <main id="app" class="flex-1 container mx-auto px-4 py-6 space-y-6">
                {banner}
                {toast}
                {content}
            </main>
        </div>
        <footer class="bg-surfaceContainer py-3">
            <p class="text-xs text-textMuted text-center">Hospital Operations Console</p>
        </footer>
    </div>
</body>
</html>"#
        )
    }

    fn sidebar(&self, config: &ShellConfig, now: DateTime<Utc>) -> String {
        let namespace = self.viewer.namespace();
        let is_admin = self.viewer.profile().is_some_and(|p| p.role.is_admin());

        let mut links = String::new();
        for page in Page::ALL {
            if page.admin_only() && !is_admin {
                continue;
            }
            let current = if self.active == Some(page) {
                r#" aria-current="page""#
            } else {
                ""
            };
            let _ = write!(
                links,
                r#"<li><a href="{}" class="block px-3 py-2 rounded-xl hover:bg-surface"{current}>{}</a></li>"#,
                namespace.href(page),
                escape(page.title())
            );
        }

        let countdown = Countdown::for_profile(
            self.viewer.profile(),
            now,
            config.upgrade_threshold_days,
            config.placeholder_days,
        );
        let upgrade = if countdown.show_upgrade {
            format!(
                r#"<a href="{}" class="upgrade inline-flex mt-2 px-3 py-1 rounded-xl bg-primary text-white">Upgrade plan</a>"#,
                namespace.href(Page::Billing)
            )
        } else {
            String::new()
        };
        let unit = if countdown.days_remaining == 1 { "day" } else { "days" };

        format!(
            r#"<aside class="w-64 shrink-0 bg-surfaceContainer" data-sidebar>
    <button type="button" class="px-3 py-2 text-sm" data-sidebar-toggle aria-controls="sidebar-nav" aria-expanded="true" aria-label="Toggle navigation">&#9776;</button>
    <nav id="sidebar-nav"><ul class="space-y-1 p-2">{links}</ul></nav>
    <div class="subscription p-3 text-sm" data-placeholder="{}">
        <span class="days-remaining">{}</span> {unit} remaining
        {upgrade}
    </div>
</aside>"#,
            countdown.placeholder, countdown.days_remaining
        )
    }

    fn banner(&self) -> String {
        match self.viewer {
            Viewer::Demo(_) => format!(
                r#"<div class="demo-banner rounded-xl bg-surfaceVariant px-4 py-3 text-sm">Demo mode: sample data only. <a href="{}" class="text-primary">Sign in</a></div>"#,
                routes::LOGIN
            ),
            viewer => match viewer.degraded_reason() {
                Some(reason) => {
                    let retry = self
                        .location
                        .or_else(|| self.active.map(Page::path))
                        .unwrap_or(routes::DASHBOARD);
                    format!(
                        r#"<div class="retry-banner rounded-xl bg-warning px-4 py-3 text-sm" role="status">We couldn't load your profile: {}. <a href="{}" class="underline">Retry</a></div>"#,
                        escape(reason),
                        escape(retry)
                    )
                }
                None => String::new(),
            },
        }
    }

    fn account(&self) -> String {
        match self.viewer {
            Viewer::Anonymous => String::new(),
            Viewer::Demo(profile) => format!(
                r#"<span class="text-sm">{} (demo)</span>"#,
                escape(&profile.display_name())
            ),
            Viewer::Session(ctx) => {
                let name = ctx
                    .profile()
                    .map_or_else(|| "Signed in".to_string(), UserProfile::display_name);
                format!(
                    r#"<form method="post" action="{}" class="flex items-center gap-3">
    <span class="text-sm">{}</span>
    <button type="submit" class="text-sm text-textMuted hover:text-textPrimary">Sign out</button>
</form>"#,
                    routes::LOGOUT,
                    escape(&name)
                )
            }
        }
    }
}
