//! Stores settings that are not expected to need to change but grouped together
//! for discoverability and reuse. Each constant should be prefixed by the module
//! name to allow importing the constant only and still be readable

pub mod client {
    /// Used when no configuration is supplied
    pub const CLIENT_DEFAULT_SERVER_ADDRESS: &str = "http://localhost:3000";
}

pub mod path {
    mod path_spec;
    pub use path_spec::PathSpec;
    pub const PATH_LOGIN: PathSpec = PathSpec::post("/auth/login");
}

/// Keys used in the device key-value store
pub mod storage_key {
    /// Holds the whole session as one JSON record
    pub const STORAGE_KEY_SESSION: &str = "session";
    pub const STORAGE_KEY_ROLE: &str = "user_permisos";

    pub mod legacy {
        //! Per-field layout written by earlier versions of the app. Only read
        //! to migrate into [`super::STORAGE_KEY_SESSION`] and removed on
        //! logout.
        pub const STORAGE_KEY_TOKEN: &str = "token";
        pub const STORAGE_KEY_USER_ID: &str = "user_id";
        pub const STORAGE_KEY_USERNAME: &str = "user_usuario";
        pub const STORAGE_KEY_DISPLAY_NAME: &str = "user_nombre";
        pub const STORAGE_KEY_CONTACT: &str = "user_email_phone";
        pub const STORAGE_KEY_STATUS: &str = "user_estado";
        pub const STORAGE_KEY_CREATED_AT: &str = "user_createdAt";
        pub const STORAGE_KEY_UPDATED_AT: &str = "user_updatedAt";

        /// Order matters, [`crate::session::Session::from_legacy_values`]
        /// expects the values in this order
        pub const STORAGE_KEYS_LEGACY_SESSION: [&str; 8] = [
            STORAGE_KEY_TOKEN,
            STORAGE_KEY_USER_ID,
            STORAGE_KEY_USERNAME,
            STORAGE_KEY_DISPLAY_NAME,
            STORAGE_KEY_CONTACT,
            STORAGE_KEY_STATUS,
            STORAGE_KEY_CREATED_AT,
            STORAGE_KEY_UPDATED_AT,
        ];
    }

    /// Every key that belongs to a session, removed together on logout
    pub fn all_session_keys() -> Vec<&'static str> {
        let mut result = vec![STORAGE_KEY_SESSION, STORAGE_KEY_ROLE];
        result.extend_from_slice(&legacy::STORAGE_KEYS_LEGACY_SESSION);
        result
    }
}
