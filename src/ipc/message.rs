//! Wire message types and the closed command-name sets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single command sent to (or received from) the renderer.
///
/// On the wire a message is `"<command>:<content>"` as UTF-8 text. The content
/// is command specific and not escaped: a `:` inside the content is fine
/// because only the first separator is significant, but list delimiters
/// (`,` or `\t`) inside list items cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub command: String,
    pub content: String,
}

impl Message {
    pub fn new(command: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            content: content.into(),
        }
    }

    /// Message with no payload.
    pub fn command_only(command: impl Into<String>) -> Self {
        Self::new(command, String::new())
    }

    /// Wire text for this message.
    pub fn encode(&self) -> String {
        format!("{}:{}", self.command, self.content)
    }

    /// Parse wire text. A message without `:` is treated as command-only.
    pub fn decode(text: &str) -> Option<Self> {
        let (command, content) = match text.split_once(':') {
            Some((command, content)) => (command, content),
            None => (text, ""),
        };

        if command.is_empty() {
            return None;
        }

        Some(Self::new(command, content))
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Content can be large (serialized motion items), keep log lines short
        const PREVIEW: usize = 64;
        if self.content.len() > PREVIEW {
            let mut end = PREVIEW;
            while !self.content.is_char_boundary(end) {
                end -= 1;
            }
            write!(f, "{}:{}...", self.command, &self.content[..end])
        } else {
            write!(f, "{}:{}", self.command, self.content)
        }
    }
}

/// Payload of a flushed composite transaction.
///
/// Serialized as JSON so the renderer can apply every included change before
/// re-evaluating, and so item contents need no extra escaping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandArray {
    pub items: Vec<Message>,
}

impl CommandArray {
    pub fn new(items: Vec<Message>) -> Self {
        Self { items }
    }

    /// Build the single `CommandArray` message for this batch.
    pub fn to_message(&self) -> Result<Message, serde_json::Error> {
        let content = serde_json::to_string(&self.items)?;
        Ok(Message::new(names::send::COMMAND_ARRAY, content))
    }

    /// Parse the content of a `CommandArray` message.
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content).map(Self::new)
    }
}

/// Command names understood by the renderer and sent by it.
pub mod names {
    /// Configurator → renderer.
    pub mod send {
        pub const COMMAND_ARRAY: &str = "CommandArray";
        pub const OPEN_VRM: &str = "OpenVrm";
        pub const LANGUAGE: &str = "Language";

        // Window
        pub const CHROMAKEY: &str = "Chromakey";
        pub const SET_TRANSPARENT: &str = "SetTransparent";
        pub const TOP_MOST: &str = "TopMost";
        pub const WINDOW_DRAGGABLE: &str = "WindowDraggable";
        pub const SET_BACKGROUND_IMAGE_PATH: &str = "SetBackgroundImagePath";
        pub const SET_WHOLE_WINDOW_TRANSPARENCY_LEVEL: &str = "SetWholeWindowTransparencyLevel";
        pub const SET_ALPHA_VALUE_ON_TRANSPARENT: &str = "SetAlphaValueOnTransparent";

        // Motion
        pub const ENABLE_NO_HAND_TRACK_MODE: &str = "EnableNoHandTrackMode";
        pub const ENABLE_FACE_TRACKING: &str = "EnableFaceTracking";
        pub const SET_CAMERA_DEVICE_NAME: &str = "SetCameraDeviceName";
        pub const AUTO_BLINK_DURING_FACE_TRACKING: &str = "AutoBlinkDuringFaceTracking";
        pub const ENABLE_BODY_LEAN_Z: &str = "EnableBodyLeanZ";
        pub const ENABLE_BLINK_ADJUST: &str = "EnableBlinkAdjust";
        pub const ENABLE_VOICE_BASED_MOTION: &str = "EnableVoiceBasedMotion";
        pub const DISABLE_FACE_TRACKING_HORIZONTAL_FLIP: &str = "DisableFaceTrackingHorizontalFlip";
        pub const ENABLE_IMAGE_BASED_HAND_TRACKING: &str = "EnableImageBasedHandTracking";
        pub const SET_CALIBRATION_FACE_DATA: &str = "SetCalibrationFaceData";
        pub const FACE_DEFAULT_FUN: &str = "FaceDefaultFun";
        pub const FACE_NEUTRAL_CLIP: &str = "FaceNeutralClip";
        pub const FACE_OFFSET_CLIP: &str = "FaceOffsetClip";
        pub const ENABLE_LIP_SYNC: &str = "EnableLipSync";
        pub const SET_MICROPHONE_DEVICE_NAME: &str = "SetMicrophoneDeviceName";
        pub const SET_MICROPHONE_SENSITIVITY: &str = "SetMicrophoneSensitivity";
        pub const SET_MICROPHONE_VOLUME_VISIBILITY: &str = "SetMicrophoneVolumeVisibility";
        pub const EYEBROW_LEFT_UP_KEY: &str = "EyebrowLeftUpKey";
        pub const EYEBROW_LEFT_DOWN_KEY: &str = "EyebrowLeftDownKey";
        pub const USE_SEPARATED_KEY_FOR_EYEBROW: &str = "UseSeparatedKeyForEyebrow";
        pub const EYEBROW_RIGHT_UP_KEY: &str = "EyebrowRightUpKey";
        pub const EYEBROW_RIGHT_DOWN_KEY: &str = "EyebrowRightDownKey";
        pub const EYEBROW_UP_SCALE: &str = "EyebrowUpScale";
        pub const EYEBROW_DOWN_SCALE: &str = "EyebrowDownScale";
        pub const LENGTH_FROM_WRIST_TO_PALM: &str = "LengthFromWristToPalm";
        pub const LENGTH_FROM_WRIST_TO_TIP: &str = "LengthFromWristToTip";
        pub const HAND_Y_OFFSET_BASIC: &str = "HandYOffsetBasic";
        pub const HAND_Y_OFFSET_AFTER_KEY_DOWN: &str = "HandYOffsetAfterKeyDown";
        pub const ENABLE_WAIT_MOTION: &str = "EnableWaitMotion";
        pub const WAIT_MOTION_SCALE: &str = "WaitMotionScale";
        pub const WAIT_MOTION_PERIOD: &str = "WaitMotionPeriod";
        pub const CALIBRATE_FACE: &str = "CalibrateFace";
        pub const REQUEST_AUTO_ADJUST: &str = "RequestAutoAdjust";
        pub const REQUEST_AUTO_ADJUST_EYEBROW: &str = "RequestAutoAdjustEyebrow";

        // Layout
        pub const CAMERA_FOV: &str = "CameraFov";
        pub const ENABLE_MID_HOLD: &str = "EnableMidHold";
        pub const HID_VISIBILITY: &str = "HidVisibility";
        pub const PEN_VISIBILITY: &str = "SetPenVisibility";
        pub const MIDI_CONTROLLER_VISIBILITY: &str = "MidiControllerVisibility";
        pub const SET_KEYBOARD_TYPING_EFFECT_TYPE: &str = "SetKeyboardTypingEffectType";
        pub const HIDE_UNUSED_DEVICES: &str = "HideUnusedDevices";
        pub const SET_CUSTOM_CAMERA_POSITION: &str = "SetCustomCameraPosition";
        pub const SET_DEVICE_LAYOUT: &str = "SetDeviceLayout";
        pub const QUICK_LOAD_VIEW_POINT: &str = "QuickLoadViewPoint";
        pub const ENABLE_FREE_CAMERA_MODE: &str = "EnableFreeCameraMode";

        // Gamepad
        pub const ENABLE_GAMEPAD: &str = "EnableGamepad";
        pub const PREFER_DIRECT_INPUT_GAMEPAD: &str = "PreferDirectInputGamepad";
        pub const GAMEPAD_LEAN_MODE: &str = "GamepadLeanMode";
        pub const GAMEPAD_LEAN_REVERSE_HORIZONTAL: &str = "GamepadLeanReverseHorizontal";
        pub const GAMEPAD_LEAN_REVERSE_VERTICAL: &str = "GamepadLeanReverseVertical";

        // Light
        pub const LIGHT_INTENSITY: &str = "LightIntensity";
        pub const LIGHT_YAW: &str = "LightYaw";
        pub const LIGHT_PITCH: &str = "LightPitch";
        pub const LIGHT_COLOR: &str = "LightColor";
        pub const SHADOW_ENABLE: &str = "ShadowEnable";
        pub const SHADOW_INTENSITY: &str = "ShadowIntensity";
        pub const BLOOM_ENABLE: &str = "BloomEnable";
        pub const BLOOM_INTENSITY: &str = "BloomIntensity";
        pub const WIND_ENABLE: &str = "WindEnable";
        pub const WIND_STRENGTH: &str = "WindStrength";

        // Word to motion
        pub const SET_DEVICE_TYPE_TO_START_WORD_TO_MOTION: &str = "SetDeviceTypeToStartWordToMotion";
        pub const RELOAD_MOTION_REQUESTS: &str = "ReloadMotionRequests";
        pub const LOAD_MIDI_NOTE_TO_MOTION_MAP: &str = "LoadMidiNoteToMotionMap";

        // External tracker
        pub const EX_TRACKER_ENABLE: &str = "ExTrackerEnable";
        pub const EX_TRACKER_ENABLE_LIP_SYNC: &str = "ExTrackerEnableLipSync";
        pub const EX_TRACKER_ENABLE_EMPHASIZE_EXPRESSION: &str = "ExTrackerEnableEmphasizeExpression";
        pub const EX_TRACKER_ENABLE_PERFECT_SYNC: &str = "ExTrackerEnablePerfectSync";
        pub const EX_TRACKER_SET_SOURCE: &str = "ExTrackerSetSource";
        pub const EX_TRACKER_SET_APPLICATION_VALUE: &str = "ExTrackerSetApplicationValue";
        pub const EX_TRACKER_SET_CALIBRATE_DATA: &str = "ExTrackerSetCalibrateData";
        pub const EX_TRACKER_SET_FACE_SWITCH_SETTING: &str = "ExTrackerSetFaceSwitchSetting";
        pub const EX_TRACKER_CALIBRATE: &str = "ExTrackerCalibrate";
    }

    /// Queries answered by the renderer.
    pub mod query {
        pub const CURRENT_CAMERA_POSITION: &str = "CurrentCameraPosition";
        pub const CURRENT_DEVICE_LAYOUT: &str = "CurrentDeviceLayout";
        pub const MICROPHONE_DEVICE_NAMES: &str = "MicrophoneDeviceNames";
        pub const CAMERA_DEVICE_NAMES: &str = "CameraDeviceNames";
        pub const GET_AVAILABLE_CUSTOM_MOTION_CLIP_NAMES: &str = "GetAvailableCustomMotionClipNames";
    }

    /// Renderer → configurator.
    pub mod receive {
        pub const CLOSE_CONFIG_WINDOW: &str = "CloseConfigWindow";
        pub const SET_CALIBRATION_FACE_DATA: &str = "SetCalibrationFaceData";
        pub const AUTO_ADJUST_RESULTS: &str = "AutoAdjustResults";
        pub const AUTO_ADJUST_EYEBROW_RESULTS: &str = "AutoAdjustEyebrowResults";
        pub const EXTRA_BLEND_SHAPE_CLIP_NAMES: &str = "ExtraBlendShapeClipNames";
        pub const MIDI_NOTE_ON: &str = "MidiNoteOn";
        pub const MICROPHONE_VOLUME_LEVEL: &str = "MicrophoneVolumeLevel";
        pub const VROID_MODEL_LOAD_COMPLETED: &str = "VRoidModelLoadCompleted";
        pub const VROID_MODEL_LOAD_CANCELED: &str = "VRoidModelLoadCanceled";
        pub const EX_TRACKER_CALIBRATE_COMPLETE: &str = "ExTrackerCalibrateComplete";
    }
}
