//! Keyboard shortcuts to editor commands.

use web_sys::KeyboardEvent;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
	Copy,
	Paste,
	Undo,
	Redo,
	DeleteSelected,
}

/// A key press reduced to what the shortcut table cares about.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyChord {
	pub key: String,
	pub ctrl: bool,
	pub meta: bool,
	pub shift: bool,
	pub alt: bool,
}

impl KeyChord {
	pub fn new(key: impl Into<String>) -> Self {
		Self {
			key: key.into(),
			..Self::default()
		}
	}

	pub fn ctrl(mut self) -> Self {
		self.ctrl = true;
		self
	}

	pub fn meta(mut self) -> Self {
		self.meta = true;
		self
	}

	pub fn shift(mut self) -> Self {
		self.shift = true;
		self
	}

	/// Ctrl on most platforms, Cmd on macOS; either counts.
	fn command_modifier(&self) -> bool {
		self.ctrl || self.meta
	}
}

impl From<&KeyboardEvent> for KeyChord {
	fn from(ev: &KeyboardEvent) -> Self {
		Self {
			key: ev.key(),
			ctrl: ev.ctrl_key(),
			meta: ev.meta_key(),
			shift: ev.shift_key(),
			alt: ev.alt_key(),
		}
	}
}

pub fn resolve(chord: &KeyChord) -> Option<Command> {
	if chord.alt {
		return None;
	}
	let key = chord.key.to_lowercase();
	if chord.command_modifier() {
		return match (key.as_str(), chord.shift) {
			("c", false) => Some(Command::Copy),
			("v", false) => Some(Command::Paste),
			("z", false) => Some(Command::Undo),
			("z", true) | ("y", false) => Some(Command::Redo),
			_ => None,
		};
	}
	match key.as_str() {
		"delete" | "backspace" => Some(Command::DeleteSelected),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn both_platform_modifiers_map_the_same() {
		assert_eq!(resolve(&KeyChord::new("c").ctrl()), Some(Command::Copy));
		assert_eq!(resolve(&KeyChord::new("c").meta()), Some(Command::Copy));
		assert_eq!(resolve(&KeyChord::new("v").meta()), Some(Command::Paste));
	}

	#[test]
	fn shifted_z_is_redo() {
		assert_eq!(resolve(&KeyChord::new("z").ctrl()), Some(Command::Undo));
		assert_eq!(resolve(&KeyChord::new("Z").ctrl().shift()), Some(Command::Redo));
		assert_eq!(resolve(&KeyChord::new("y").ctrl()), Some(Command::Redo));
	}

	#[test]
	fn delete_needs_no_modifier() {
		assert_eq!(resolve(&KeyChord::new("Delete")), Some(Command::DeleteSelected));
		assert_eq!(resolve(&KeyChord::new("Backspace")), Some(Command::DeleteSelected));
		assert_eq!(resolve(&KeyChord::new("c")), None);
		assert_eq!(resolve(&KeyChord::new("Delete").ctrl()), None);
	}
}
