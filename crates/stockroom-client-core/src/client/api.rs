use stockroom_shared::session::StoredUser;

use crate::Client;

impl Client {
    /// Ends the session on this device. The server is not contacted, the token
    /// simply stops being sent.
    #[tracing::instrument(skip(self))]
    pub async fn logout(&self) {
        self.permissions.clear_session().await;
    }

    /// Profile of the logged in user if there is one
    pub async fn user(&self) -> Option<StoredUser> {
        self.session.user().await
    }
}
