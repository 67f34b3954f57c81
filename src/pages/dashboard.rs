use crate::app::RouteLink;
use crate::components::ui::{
    Card, CardContent, CardDescription, CardHeader, CardItem, CardList, CardTitle, StatusBadge,
};
use crate::models::{Post, PostStatus};
use crate::util::format_local;
use chrono::{DateTime, Utc};
use leptos::prelude::*;
use strum::IntoEnumIterator;

const UPCOMING_LIMIT: usize = 5;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct DashboardSummary {
    /// Every status in declaration order, zeros included.
    pub counts: Vec<(PostStatus, usize)>,
    pub total: usize,
    /// Next posts still waiting to go out, soonest first.
    pub upcoming: Vec<Post>,
}

impl DashboardSummary {
    pub fn from_posts(posts: &[Post], now: DateTime<Utc>) -> Self {
        let counts = PostStatus::iter()
            .map(|s| (s, posts.iter().filter(|p| p.status == s).count()))
            .collect();

        let mut upcoming: Vec<Post> = posts
            .iter()
            .filter(|p| p.scheduled_at > now && p.status.is_editable())
            .cloned()
            .collect();
        upcoming.sort_by_key(|p| p.scheduled_at);
        upcoming.truncate(UPCOMING_LIMIT);

        Self {
            counts,
            total: posts.len(),
            upcoming,
        }
    }

    pub fn count(&self, status: PostStatus) -> usize {
        self.counts
            .iter()
            .find(|(s, _)| *s == status)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }
}

#[component]
pub fn DashboardPage(summary: DashboardSummary) -> impl IntoView {
    let pending = summary.count(PostStatus::Pending);
    let DashboardSummary {
        counts,
        total,
        upcoming,
    } = summary;

    let tiles = counts
        .into_iter()
        .map(|(status, n)| {
            view! {
                <div class="rounded-lg border px-4 py-3">
                    <div class="text-2xl font-semibold">{n}</div>
                    <StatusBadge status=status class="mt-1" />
                </div>
            }
        })
        .collect_view();

    let upcoming = if upcoming.is_empty() {
        view! { <p class="text-sm text-muted-foreground">"Nothing scheduled yet."</p> }.into_any()
    } else {
        let rows = upcoming
            .into_iter()
            .map(|p| {
                let to = format!("posts/{}", p.id);
                view! {
                    <CardItem>
                        <span class="w-48 shrink-0 text-xs text-muted-foreground">{format_local(&p.scheduled_at)}</span>
                        <RouteLink to=to class="flex-1 truncate text-sm hover:underline">{p.caption}</RouteLink>
                        <StatusBadge status=p.status />
                    </CardItem>
                }
            })
            .collect_view();
        view! { <CardList>{rows}</CardList> }.into_any()
    };

    view! {
        <div class="flex flex-col gap-6">
            <div class="flex items-center justify-between">
                <h1 class="text-xl font-semibold">"Dashboard"</h1>
                <div class="flex gap-3 text-sm">
                    <RouteLink to="posts" class="text-primary hover:underline">"All posts"</RouteLink>
                    <RouteLink to="batches/new" class="text-primary hover:underline">"New batch"</RouteLink>
                    <RouteLink to="schedule" class="text-primary hover:underline">"Schedule"</RouteLink>
                </div>
            </div>

            <div class="grid grid-cols-2 gap-3 sm:grid-cols-4">{tiles}</div>

            <Card>
                <CardHeader>
                    <CardTitle>"Coming up"</CardTitle>
                    <CardDescription>
                        {format!("{pending} of {total} posts awaiting review")}
                    </CardDescription>
                </CardHeader>
                <CardContent>{upcoming}</CardContent>
            </Card>
        </div>
    }
}
