mod bulk;

pub(crate) use bulk::{perform_bulk_action, BulkAction, BulkError, BulkHost, BulkOutcome, Notifier};

use crate::models::Post;
use std::collections::HashSet;

/// Checked state of a "select all" control.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SelectAllState {
    Unchecked,
    Indeterminate,
    Checked,
}

/// Ids of the posts chosen for a bulk action.
///
/// Ids of posts that are not selectable are never inserted. Ids whose post
/// disappeared on reload are left in place; the backend reports them as
/// failures on the next bulk call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct SelectionSet {
    ids: HashSet<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip one post's membership. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, post: &Post) -> bool {
        if self.ids.remove(&post.id) {
            return false;
        }
        if !post.status.is_selectable() {
            return false;
        }
        self.ids.insert(post.id.clone());
        true
    }

    /// Select every eligible post in `posts`, leaving ineligible ones alone.
    pub fn select_all<'a>(&mut self, posts: impl IntoIterator<Item = &'a Post>) {
        self.ids.extend(
            posts
                .into_iter()
                .filter(|p| p.status.is_selectable())
                .map(|p| p.id.clone()),
        );
    }

    /// Drop every post in `posts` from the selection.
    pub fn deselect_all<'a>(&mut self, posts: impl IntoIterator<Item = &'a Post>) {
        for p in posts {
            self.ids.remove(&p.id);
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected ids in a stable order, for request payloads.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.ids.iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Derived state of the select-all control for the listed `posts`.
    pub fn select_all_state<'a>(&self, posts: impl IntoIterator<Item = &'a Post>) -> SelectAllState {
        let (eligible, selected) = posts
            .into_iter()
            .filter(|p| p.status.is_selectable())
            .fold((0usize, 0usize), |(e, s), p| {
                (e + 1, s + usize::from(self.ids.contains(&p.id)))
            });

        if eligible > 0 && selected == eligible {
            SelectAllState::Checked
        } else if selected > 0 {
            SelectAllState::Indeterminate
        } else {
            SelectAllState::Unchecked
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::PostStatus;

    pub(crate) fn post(id: &str, status: PostStatus) -> Post {
        Post {
            id: id.to_string(),
            status,
            caption: format!("caption {id}"),
            subject: None,
            scheduled_at: chrono::Utc::now(),
            media: vec![],
            post_type: None,
            platform: None,
            batch_id: None,
            error_message: None,
        }
    }

    fn seven_posts() -> Vec<Post> {
        vec![
            post("p1", PostStatus::Scheduled),
            post("p2", PostStatus::Pending),
            post("p3", PostStatus::Posted),
            post("p4", PostStatus::Approved),
            post("p5", PostStatus::Publishing),
            post("p6", PostStatus::Failed),
            post("p7", PostStatus::Ready),
        ]
    }

    #[test]
    fn test_select_all_only_takes_eligible() {
        let posts = seven_posts();
        let mut sel = SelectionSet::new();
        sel.select_all(&posts);

        assert_eq!(sel.ids(), vec!["p1", "p2", "p4", "p6", "p7"]);
        assert_eq!(sel.select_all_state(&posts), SelectAllState::Checked);
    }

    #[test]
    fn test_partial_deselection_is_indeterminate() {
        let posts = seven_posts();
        let mut sel = SelectionSet::new();
        sel.select_all(&posts);

        for id in ["p1", "p2", "p4"] {
            let p = posts.iter().find(|p| p.id == id).expect("post exists");
            assert!(!sel.toggle(p));
        }

        assert_eq!(sel.len(), 2);
        assert_eq!(sel.select_all_state(&posts), SelectAllState::Indeterminate);
    }

    #[test]
    fn test_toggle_refuses_ineligible() {
        let mut sel = SelectionSet::new();
        assert!(!sel.toggle(&post("x", PostStatus::Posted)));
        assert!(!sel.toggle(&post("y", PostStatus::Publishing)));
        assert!(sel.is_empty());

        assert!(sel.toggle(&post("z", PostStatus::Cancelled)));
        assert!(sel.contains("z"));
    }

    #[test]
    fn test_select_all_state_edges() {
        let sel = SelectionSet::new();
        assert_eq!(sel.select_all_state(&seven_posts()), SelectAllState::Unchecked);

        // Nothing eligible: never checked.
        let only_posted = vec![post("a", PostStatus::Posted)];
        assert_eq!(sel.select_all_state(&only_posted), SelectAllState::Unchecked);
    }

    #[test]
    fn test_stale_ids_do_not_count_towards_state() {
        let mut sel = SelectionSet::new();
        sel.toggle(&post("gone", PostStatus::Pending));

        let reloaded = vec![post("p1", PostStatus::Pending)];
        assert_eq!(sel.select_all_state(&reloaded), SelectAllState::Unchecked);
        // Still submitted; the backend reports it as failed.
        assert_eq!(sel.ids(), vec!["gone"]);
    }

    #[test]
    fn test_clear_and_deselect_all() {
        let posts = seven_posts();
        let mut sel = SelectionSet::new();
        sel.select_all(&posts);
        sel.deselect_all(&posts[..2]);
        assert_eq!(sel.len(), 3);
        sel.clear();
        assert!(sel.is_empty());
    }
}
