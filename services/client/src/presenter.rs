/// The presentation boundary a [`crate::ClientReceiver`] forwards decoded
/// events to. A terminal UI, a GUI, or a test harness all implement this
/// the same way.
pub trait Presenter: Send + Sync {
    fn login_ok(&self, color: &str);
    fn register_ok(&self, username: &str);
    fn register_fail(&self, reason: &str);
    fn message(&self, origin: &str, body: &str);
    fn user_list(&self, users: &[String]);
    fn error(&self, reason: &str);
}

/// Writes every event to stdout/stderr, one line each. The default shell
/// for `services/client`'s binary; the desktop UI this stands in for is
/// out of scope.
#[derive(Default)]
pub struct StdoutPresenter;

impl Presenter for StdoutPresenter {
    fn login_ok(&self, color: &str) {
        println!("logged in (color: {color})");
    }

    fn register_ok(&self, username: &str) {
        println!("registered as {username}");
    }

    fn register_fail(&self, reason: &str) {
        eprintln!("registration failed: {reason}");
    }

    fn message(&self, origin: &str, body: &str) {
        println!("{origin}: {body}");
    }

    fn user_list(&self, users: &[String]) {
        println!("online: {}", users.join(", "));
    }

    fn error(&self, reason: &str) {
        eprintln!("error: {reason}");
    }
}
