#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Signup,
    Tasks,
    Profile,
}

impl Route {
    /// Unknown paths land on the login page.
    pub fn parse(path: &str) -> Self {
        match path.trim_matches('/') {
            "home" => Self::Home,
            "signup" => Self::Signup,
            "tasks" => Self::Tasks,
            "profile" => Self::Profile,
            _ => Self::Login,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Self::Home => "/home",
            Self::Login => "/login",
            Self::Signup => "/signup",
            Self::Tasks => "/tasks",
            Self::Profile => "/profile",
        }
    }

    pub fn requires_sign_in(self) -> bool {
        matches!(self, Self::Tasks | Self::Profile)
    }
}

/// Applies the route guards and returns where the user actually ends up.
pub fn resolve(requested: Route, signed_in: bool) -> Route {
    match (requested.requires_sign_in(), signed_in) {
        (true, false) => Route::Login,
        (false, true) => Route::Tasks,
        _ => requested,
    }
}
