use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct AuthorizationUrlResponse {
    pub auth_url: String,
    pub state: String,
}

#[derive(Debug, Serialize)]
pub struct DisconnectResponse {
    pub message: String,
    pub is_connected: bool,
}
