use serde::{Deserialize, Serialize};

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name_first: String,
    pub name_last: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub u_id: u64,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub is_success: bool,
}

// -- Users --

#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub u_id: u64,
    pub email: String,
    pub name_first: String,
    pub name_last: String,
    pub handle_str: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_img_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserProfileResponse {
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct UsersAllResponse {
    pub users: Vec<UserProfile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetNameRequest {
    pub name_first: String,
    pub name_last: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetEmailRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetHandleRequest {
    pub handle_str: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PermissionChangeRequest {
    pub u_id: u64,
    pub permission_id: u64,
}

// -- Channels --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelCreateRequest {
    pub name: String,
    pub is_public: bool,
}

#[derive(Debug, Serialize)]
pub struct ChannelCreateResponse {
    pub channel_id: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChannelSummary {
    pub channel_id: u64,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct ChannelListResponse {
    pub channels: Vec<ChannelSummary>,
}

/// Member projection used by channel details for both member lists.
#[derive(Debug, Clone, Serialize)]
pub struct MemberProfile {
    pub u_id: u64,
    pub name_first: String,
    pub name_last: String,
    pub profile_img_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChannelDetailsResponse {
    pub name: String,
    pub owner_members: Vec<MemberProfile>,
    pub all_members: Vec<MemberProfile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InviteRequest {
    pub channel_id: u64,
    pub u_id: u64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelIdRequest {
    pub channel_id: u64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OwnerChangeRequest {
    pub channel_id: u64,
    pub u_id: u64,
}

// -- Messages --

/// Caller-relative reaction projection: `is_this_user_reacted` is computed
/// against the viewing account on every request, never stored.
#[derive(Debug, Clone, Serialize)]
pub struct ReactView {
    pub react_id: u64,
    pub u_ids: Vec<u64>,
    pub is_this_user_reacted: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageView {
    pub message_id: u64,
    pub u_id: u64,
    pub message: String,
    pub time_created: i64,
    pub reacts: Vec<ReactView>,
    pub is_pinned: bool,
}

/// One page of reverse-chronological messages. `end == -1` means the page
/// reached the oldest message.
#[derive(Debug, Serialize)]
pub struct MessagesPage {
    pub messages: Vec<MessageView>,
    pub start: usize,
    pub end: i64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendMessageRequest {
    pub channel_id: u64,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub message_id: u64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendLaterRequest {
    pub channel_id: u64,
    pub message: String,
    /// Epoch seconds at which the message should land in the channel.
    pub time_sent: i64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EditMessageRequest {
    pub message_id: u64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoveMessageRequest {
    pub message_id: u64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReactRequest {
    pub message_id: u64,
    pub react_id: u64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PinRequest {
    pub message_id: u64,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub messages: Vec<MessageView>,
}

// -- Standups --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StandupStartRequest {
    pub channel_id: u64,
    /// Duration in seconds.
    pub length: i64,
}

#[derive(Debug, Serialize)]
pub struct StandupStartResponse {
    pub time_finish: i64,
}

#[derive(Debug, Serialize)]
pub struct StandupActiveResponse {
    pub is_active: bool,
    pub time_finish: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StandupSendRequest {
    pub channel_id: u64,
    pub message: String,
}
