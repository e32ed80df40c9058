pub mod completion;
pub mod config;
pub mod groups;
pub mod invitations;
pub mod recipes;
pub mod session;
pub mod shopping;
pub mod tabs;
pub mod users;

fn pin_marker(pinned: bool) -> &'static str {
    if pinned { "📌" } else { "  " }
}
