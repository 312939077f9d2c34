use {
    serde::{
        Deserialize,
        Serialize,
    },
    std::fmt,
};

pub const ACTOR_ID_MAX_LEN: usize = 128;

/// Identity of a seller or bidder, as forwarded by the identity provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ActorId(String);

impl ActorId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ActorId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Err("Actor id is empty".to_string());
        }
        if value.len() > ACTOR_ID_MAX_LEN {
            return Err(format!(
                "Actor id is too long: {} > {}",
                value.len(),
                ACTOR_ID_MAX_LEN
            ));
        }
        if value.chars().any(char::is_control) {
            return Err("Actor id contains control characters".to_string());
        }
        Ok(Self(value))
    }
}

impl From<ActorId> for String {
    fn from(actor: ActorId) -> Self {
        actor.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
