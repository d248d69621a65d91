use crate::interaction::InteractionStore;
use crate::music::MusicStore;
use crate::user::UserStore;

/// Everything the server needs from persistence, behind one handle.
pub trait Store: MusicStore + InteractionStore + UserStore {}

impl<T> Store for T where T: MusicStore + InteractionStore + UserStore {}
