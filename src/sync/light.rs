use crate::ipc::{MessageSender, names::send};
use crate::models::{LightSetting, Rgb};
use crate::sync::{SettingCategorySync, SyncedField};
use std::sync::Arc;

pub struct LightSettingSync {
    pub light_intensity: SyncedField<i32>,
    pub light_yaw: SyncedField<i32>,
    pub light_pitch: SyncedField<i32>,
    pub light_color: SyncedField<Rgb>,

    pub enable_shadow: SyncedField<bool>,
    pub shadow_intensity: SyncedField<i32>,

    pub enable_bloom: SyncedField<bool>,
    pub bloom_intensity: SyncedField<i32>,

    pub enable_wind: SyncedField<bool>,
    pub wind_strength: SyncedField<i32>,
}

impl LightSettingSync {
    pub fn new(sender: &Arc<dyn MessageSender>) -> Self {
        let d = LightSetting::default();
        Self {
            light_intensity: SyncedField::new(sender, send::LIGHT_INTENSITY, d.light_intensity),
            light_yaw: SyncedField::new(sender, send::LIGHT_YAW, d.light_yaw),
            light_pitch: SyncedField::new(sender, send::LIGHT_PITCH, d.light_pitch),
            light_color: SyncedField::new(sender, send::LIGHT_COLOR, d.light_color),

            enable_shadow: SyncedField::new(sender, send::SHADOW_ENABLE, d.enable_shadow),
            shadow_intensity: SyncedField::new(sender, send::SHADOW_INTENSITY, d.shadow_intensity),

            enable_bloom: SyncedField::new(sender, send::BLOOM_ENABLE, d.enable_bloom),
            bloom_intensity: SyncedField::new(sender, send::BLOOM_INTENSITY, d.bloom_intensity),

            enable_wind: SyncedField::new(sender, send::WIND_ENABLE, d.enable_wind),
            wind_strength: SyncedField::new(sender, send::WIND_STRENGTH, d.wind_strength),
        }
    }
}

impl SettingCategorySync for LightSettingSync {
    type Data = LightSetting;
    const NAME: &'static str = "light";

    fn save(&self) -> LightSetting {
        LightSetting {
            light_intensity: self.light_intensity.value(),
            light_yaw: self.light_yaw.value(),
            light_pitch: self.light_pitch.value(),
            light_color: self.light_color.value(),
            enable_shadow: self.enable_shadow.value(),
            shadow_intensity: self.shadow_intensity.value(),
            enable_bloom: self.enable_bloom.value(),
            bloom_intensity: self.bloom_intensity.value(),
            enable_wind: self.enable_wind.value(),
            wind_strength: self.wind_strength.value(),
        }
    }

    fn load(&mut self, data: &LightSetting) {
        self.light_intensity.apply_local(data.light_intensity);
        self.light_yaw.apply_local(data.light_yaw);
        self.light_pitch.apply_local(data.light_pitch);
        self.light_color.apply_local(data.light_color);
        self.enable_shadow.apply_local(data.enable_shadow);
        self.shadow_intensity.apply_local(data.shadow_intensity);
        self.enable_bloom.apply_local(data.enable_bloom);
        self.bloom_intensity.apply_local(data.bloom_intensity);
        self.enable_wind.apply_local(data.enable_wind);
        self.wind_strength.apply_local(data.wind_strength);
    }

    fn reset_to_default(&mut self) {
        self.load(&LightSetting::default());
    }
}
