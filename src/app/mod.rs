// Conversational layer: message routing, owned-part detection, requirements
// lookup and reply rendering around the build engine.

pub mod assistant;
pub mod intent;
pub mod lookup;
pub mod owned;
pub mod render;
pub mod session;

pub use assistant::{Assistant, BuildReply, ChatReply, RequirementsDetail};
pub use intent::Intent;
pub use lookup::{RequirementRecord, RequirementsResolver, SteamClient};
pub use session::{SessionState, SessionStore};
