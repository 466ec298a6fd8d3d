#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use sedusa_core::{
    Actuator, Band, Caps, DeviceError, MotifLibrary, Motion, Narrative, PatternDefinition, PatternLookup,
    SessionManager, SessionRequest, StorySettings, SubSegment,
};
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Window(f64, f64),
    Speed(f64),
    Start,
    Stop,
}

/// Actuator that records every command with the virtual time it arrived.
#[derive(Default)]
pub struct RecordingActuator {
    log: Mutex<Vec<(Instant, Command)>>,
    failing: AtomicBool,
}

impl RecordingActuator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every command fails, but is still recorded.
    pub fn failing() -> Arc<Self> {
        let actuator = Self::default();
        actuator.failing.store(true, Ordering::SeqCst);
        Arc::new(actuator)
    }

    pub fn commands(&self) -> Vec<Command> {
        self.log.lock().unwrap().iter().map(|(_, c)| *c).collect()
    }

    pub fn count(&self) -> usize {
        self.log.lock().unwrap().len()
    }

    pub fn commands_since(&self, since: Instant) -> Vec<Command> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|(at, _)| *at >= since)
            .map(|(_, c)| *c)
            .collect()
    }

    fn record(&self, command: Command) -> Result<(), DeviceError> {
        self.log.lock().unwrap().push((Instant::now(), command));
        if self.failing.load(Ordering::SeqCst) {
            Err(DeviceError::Status {
                path: "test".into(),
                status: 503,
            })
        } else {
            Ok(())
        }
    }
}

impl Actuator for RecordingActuator {
    async fn set_window(&self, min_mm: f64, max_mm: f64) -> Result<(), DeviceError> {
        self.record(Command::Window(min_mm, max_mm))
    }

    async fn set_speed(&self, hz: f64) -> Result<(), DeviceError> {
        self.record(Command::Speed(hz))
    }

    async fn start_motion(&self) -> Result<(), DeviceError> {
        self.record(Command::Start)
    }

    async fn stop_motion(&self) -> Result<(), DeviceError> {
        self.record(Command::Stop)
    }
}

pub fn library() -> MotifLibrary {
    MotifLibrary::from_patterns([
        PatternDefinition::simple("shallow_tease", 10.0, 40.0, 2000),
        PatternDefinition::simple("middle_glide", 50.0, 60.0, 2500).with_motion(Motion::Triangle),
        PatternDefinition::simple("deep_press", 90.0, 80.0, 3000).with_motion(Motion::Burst {
            on_ms: 300,
            off_ms: 200,
        }),
        PatternDefinition::simple("flutter", 45.0, 30.0, 2000).with_motion(Motion::Pulse { cycles: 4, sp2: 90.0 }),
        PatternDefinition::combo(
            "coil",
            4000,
            vec![
                SubSegment {
                    depth_percent: Some(15.0),
                    ..Default::default()
                },
                SubSegment {
                    depth_percent: Some(80.0),
                    ..Default::default()
                },
            ],
        )
        .with_dominant_band(Band::C),
        PatternDefinition::simple("snake_freeze", 30.0, 10.0, 3000).with_motion(Motion::Hold),
        PatternDefinition::simple("snake_pass", 60.0, 70.0, 3000),
        PatternDefinition::combo(
            "wave_train_progressive",
            5000,
            vec![
                SubSegment {
                    depth_percent: Some(20.0),
                    ..Default::default()
                },
                SubSegment {
                    depth_percent: Some(50.0),
                    ..Default::default()
                },
                SubSegment {
                    depth_percent: Some(85.0),
                    ..Default::default()
                },
            ],
        ),
    ])
}

pub fn narrative() -> Narrative {
    let pools = [
        ("INVITE", vec!["Come closer. [soft]"]),
        ("STORY_TRAP", vec!["There is no way out."]),
        ("STORY_REVELATION", vec!["Now you see me."]),
        ("STORY_TEST", vec!["Hold still.", "Not yet. [slow]"]),
        ("STORY_GAZE", vec!["Look at me."]),
        ("STORY_RELEASE", vec!["Let go."]),
        ("OUTRO", vec!["Rest now. [whisper]"]),
    ];
    Narrative::new(
        pools
            .into_iter()
            .map(|(key, lines)| (key.to_string(), lines.into_iter().map(String::from).collect()))
            .collect::<HashMap<_, _>>(),
    )
}

/// Serves the scripted Gaze and Release patterns but offers nothing for
/// playlists, so every story act before the Gaze ends immediately.
pub struct ScriptOnly(MotifLibrary);

impl PatternLookup for ScriptOnly {
    fn get_pattern(&self, name: &str) -> Option<&PatternDefinition> {
        self.0.get_pattern(name)
    }

    fn pattern_names(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Gaze freeze of `freeze_ms`, a 3s pass at 70% speed and a 5s release.
pub fn script_manager(freeze_ms: u64) -> SessionManager<ScriptOnly, RecordingActuator> {
    let library = MotifLibrary::from_patterns([
        PatternDefinition::simple("snake_freeze", 30.0, 10.0, freeze_ms).with_motion(Motion::Hold),
        PatternDefinition::simple("snake_pass", 60.0, 70.0, 3000),
        PatternDefinition::combo(
            "wave_train_progressive",
            5000,
            vec![
                SubSegment {
                    depth_percent: Some(20.0),
                    ..Default::default()
                },
                SubSegment {
                    depth_percent: Some(85.0),
                    ..Default::default()
                },
            ],
        ),
    ]);
    SessionManager::new(
        Arc::new(ScriptOnly(library)),
        Arc::new(narrative()),
        Caps::default(),
        StorySettings::default(),
    )
}

pub fn manager() -> SessionManager<MotifLibrary, RecordingActuator> {
    SessionManager::new(
        Arc::new(library()),
        Arc::new(narrative()),
        Caps::default(),
        StorySettings::default(),
    )
}

pub fn request(length_min: u32, seed: u64) -> SessionRequest {
    SessionRequest {
        depth_min: 20.0,
        depth_max: 100.0,
        speed_min: 0.5,
        speed_max: 2.5,
        length_min,
        name: Some("tester".into()),
        seed: Some(seed),
    }
}
