//! Hash-based routing: the route table and matcher live here, the
//! navigation controller and page lifecycle in the submodules.

pub(crate) mod controller;
pub(crate) mod lifecycle;

pub(crate) use controller::{
    BrowserLocation, Commit, Confirm, GuardKind, LocationPort, NavigateOutcome,
    NavigationController,
};
pub(crate) use lifecycle::{
    run_page, PageError, PageHandler, PageRegistry, PageSink, PageState, RenderOutcome,
};

use std::collections::{BTreeMap, HashMap};
use strum::{AsRefStr, Display, EnumIter};

/// Handler keys for every page the client can show.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub(crate) enum PageKey {
    Login,
    Dashboard,
    Posts,
    PostNew,
    PostDetail,
    PostEdit,
    BatchNew,
    BatchDetail,
    Schedule,
    AdminLanding,
}

pub(crate) type RouteParams = BTreeMap<String, String>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Segment {
    Literal(String),
    Capture(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    pub fn parse(raw: &str) -> Self {
        let segments = raw
            .split('/')
            .map(|s| match s.strip_prefix(':') {
                Some(name) => Segment::Capture(name.to_string()),
                None => Segment::Literal(s.to_string()),
            })
            .collect();
        Self {
            raw: raw.to_string(),
            segments,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_literal(&self) -> bool {
        self.segments
            .iter()
            .all(|s| matches!(s, Segment::Literal(_)))
    }

    /// Segment-wise match. Counts must agree exactly; captures bind anything.
    pub fn match_segments(&self, parts: &[&str]) -> Option<RouteParams> {
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = RouteParams::new();
        for (seg, part) in self.segments.iter().zip(parts) {
            match seg {
                Segment::Literal(lit) if lit == part => {}
                Segment::Literal(_) => return None,
                Segment::Capture(name) => {
                    params.insert(name.clone(), (*part).to_string());
                }
            }
        }
        Some(params)
    }
}

#[derive(Clone, Debug)]
pub(crate) struct RouteDef {
    pub pattern: RoutePattern,
    pub title: String,
    pub page: PageKey,
}

/// A route resolved for one navigation.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ResolvedRoute {
    pub title: String,
    pub page: PageKey,
    pub params: RouteParams,
    pub pattern: String,
}

impl ResolvedRoute {
    fn from_def(def: &RouteDef, params: RouteParams) -> Self {
        Self {
            title: def.title.clone(),
            page: def.page,
            params,
            pattern: def.pattern.as_str().to_string(),
        }
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// First pattern segment, used as the active-navigation key.
    pub fn section(&self) -> &str {
        self.pattern.split('/').next().unwrap_or_default()
    }
}

#[derive(Clone, Debug)]
pub(crate) struct RouteTable {
    routes: Vec<RouteDef>,
    /// Full-path index over all-literal patterns; first registration wins.
    literals: HashMap<String, usize>,
    rewrites: HashMap<String, String>,
    default_path: String,
    admin_landing_path: String,
    login_path: String,
}

impl RouteTable {
    pub fn new(default_path: &str, admin_landing_path: &str, login_path: &str) -> Self {
        Self {
            routes: Vec::new(),
            literals: HashMap::new(),
            rewrites: HashMap::new(),
            default_path: default_path.to_string(),
            admin_landing_path: admin_landing_path.to_string(),
            login_path: login_path.to_string(),
        }
    }

    pub fn route(mut self, pattern: &str, title: &str, page: PageKey) -> Self {
        let pattern = RoutePattern::parse(pattern);
        if pattern.is_literal() {
            self.literals
                .entry(pattern.as_str().to_string())
                .or_insert(self.routes.len());
        }
        self.routes.push(RouteDef {
            pattern,
            title: title.to_string(),
            page,
        });
        self
    }

    /// Register a retired path and its replacement (exact string match).
    pub fn rewrite(mut self, from: &str, to: &str) -> Self {
        self.rewrites.insert(from.to_string(), to.to_string());
        self
    }

    pub fn rewrite_for(&self, path: &str) -> Option<&str> {
        self.rewrites.get(path).map(String::as_str)
    }

    pub fn default_path(&self) -> &str {
        &self.default_path
    }

    pub fn admin_landing_path(&self) -> &str {
        &self.admin_landing_path
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Resolve a marker-stripped path.
    ///
    /// An empty path means the default route. No other normalisation is
    /// applied, so trailing slashes and empty segments only match patterns
    /// that spell them out.
    pub fn resolve(&self, path: &str) -> Option<ResolvedRoute> {
        let path = if path.is_empty() {
            self.default_path.as_str()
        } else {
            path
        };

        if let Some(&idx) = self.literals.get(path) {
            return Some(ResolvedRoute::from_def(&self.routes[idx], RouteParams::new()));
        }

        let parts: Vec<&str> = path.split('/').collect();
        self.routes
            .iter()
            .filter(|def| !def.pattern.is_literal())
            .find_map(|def| {
                def.pattern
                    .match_segments(&parts)
                    .map(|params| ResolvedRoute::from_def(def, params))
            })
    }

    pub fn default_route(&self) -> Option<ResolvedRoute> {
        self.resolve(&self.default_path)
    }

    pub fn admin_landing_route(&self) -> Option<ResolvedRoute> {
        self.resolve(&self.admin_landing_path)
    }

    pub fn login_route(&self) -> Option<ResolvedRoute> {
        self.resolve(&self.login_path)
    }

    pub fn routes(&self) -> &[RouteDef] {
        &self.routes
    }
}

/// The application's route table, in precedence order.
pub(crate) fn app_routes() -> RouteTable {
    RouteTable::new("dashboard", "admin", "login")
        .route("login", "Sign in", PageKey::Login)
        .route("dashboard", "Dashboard", PageKey::Dashboard)
        .route("posts", "Posts", PageKey::Posts)
        .route("posts/new", "New post", PageKey::PostNew)
        .route("posts/:id", "Post", PageKey::PostDetail)
        .route("posts/:id/edit", "Edit post", PageKey::PostEdit)
        .route("batches/new", "New batch", PageKey::BatchNew)
        .route("batches/:id", "Batch", PageKey::BatchDetail)
        .route("schedule", "Schedule", PageKey::Schedule)
        .route("admin", "Admin", PageKey::AdminLanding)
        .rewrite("create", "posts/new")
        .rewrite("bulk", "batches/new")
        .rewrite("calendar", "schedule")
        .rewrite("settings", "schedule")
}
