use crate::ipc::{Message, MessageSender, names::receive, names::send};
use crate::models::{WordToMotionDevice, WordToMotionSetting};
use crate::sync::{SettingCategorySync, SyncedField};
use indexmap::IndexSet;
use std::sync::Arc;

pub struct WordToMotionSettingSync {
    pub selected_device: SyncedField<WordToMotionDevice>,
    /// Serialized motion item list, owned by the UI editor.
    pub items_content: SyncedField<String>,
    pub midi_note_to_motion_map: SyncedField<String>,

    extra_blend_shape_clip_names: IndexSet<String>,
    latest_avatar_extra_clip_names: Vec<String>,
    last_midi_note: Option<i32>,
}

impl WordToMotionSettingSync {
    pub fn new(sender: &Arc<dyn MessageSender>) -> Self {
        let d = WordToMotionSetting::default();
        Self {
            selected_device: SyncedField::new(
                sender,
                send::SET_DEVICE_TYPE_TO_START_WORD_TO_MOTION,
                d.selected_device,
            ),
            items_content: SyncedField::new(sender, send::RELOAD_MOTION_REQUESTS, d.items_content),
            midi_note_to_motion_map: SyncedField::new(
                sender,
                send::LOAD_MIDI_NOTE_TO_MOTION_MAP,
                d.midi_note_to_motion_map,
            ),
            extra_blend_shape_clip_names: d.extra_blend_shape_clip_names,
            latest_avatar_extra_clip_names: Vec::new(),
            last_midi_note: None,
        }
    }

    /// Every extra clip name ever seen, in first-seen order.
    pub fn extra_blend_shape_clip_names(&self) -> &IndexSet<String> {
        &self.extra_blend_shape_clip_names
    }

    /// Extra clips reported for the avatar loaded right now.
    pub fn latest_avatar_extra_clip_names(&self) -> &[String] {
        &self.latest_avatar_extra_clip_names
    }

    /// Last note reported while a MIDI controller is assigned.
    pub fn last_midi_note(&self) -> Option<i32> {
        self.last_midi_note
    }

    pub fn forget_extra_clip_name(&mut self, name: &str) -> bool {
        self.extra_blend_shape_clip_names.shift_remove(name)
    }
}

impl SettingCategorySync for WordToMotionSettingSync {
    type Data = WordToMotionSetting;
    const NAME: &'static str = "wordToMotion";

    fn save(&self) -> WordToMotionSetting {
        WordToMotionSetting {
            selected_device: self.selected_device.value(),
            items_content: self.items_content.value(),
            midi_note_to_motion_map: self.midi_note_to_motion_map.value(),
            extra_blend_shape_clip_names: self.extra_blend_shape_clip_names.clone(),
        }
    }

    fn load(&mut self, data: &WordToMotionSetting) {
        self.selected_device.apply_local(data.selected_device);
        self.items_content.apply_local(data.items_content.clone());
        self.midi_note_to_motion_map
            .apply_local(data.midi_note_to_motion_map.clone());
        self.extra_blend_shape_clip_names = data.extra_blend_shape_clip_names.clone();
    }

    fn reset_to_default(&mut self) {
        self.load(&WordToMotionSetting::default());
    }

    fn handle_inbound(&mut self, message: &Message) -> bool {
        match message.command.as_str() {
            receive::EXTRA_BLEND_SHAPE_CLIP_NAMES => {
                let names: Vec<String> = message
                    .content
                    .split(',')
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect();

                for name in &names {
                    if self.extra_blend_shape_clip_names.insert(name.clone()) {
                        tracing::debug!("New extra blend shape clip: {}", name);
                    }
                }
                self.latest_avatar_extra_clip_names = names;
                true
            }
            receive::MIDI_NOTE_ON => {
                match message.content.trim().parse::<i32>() {
                    Ok(note) => self.last_midi_note = Some(note),
                    Err(e) => tracing::debug!("Bad MIDI note '{}': {}", message.content, e),
                }
                true
            }
            _ => false,
        }
    }
}
