//! Startup check for the runtime components the mirror cannot work without.

use std::fmt;

use crate::camera::native;

/// A runtime component that is not available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingDependency {
    /// No platform camera API that the capture backend can drive
    CameraApi,
    /// SDL could not start its video subsystem (no SDL2 library or no
    /// graphical session)
    VideoSubsystem(String),
}

impl MissingDependency {
    fn hint(&self) -> &'static str {
        match self {
            MissingDependency::CameraApi => {
                "Camera capture needs V4L2 (Linux), AVFoundation (macOS) or Media Foundation (Windows)."
            }
            MissingDependency::VideoSubsystem(_) => {
                "Install SDL2 (for example `apt install libsdl2-2.0-0` or `brew install sdl2`) and run from a graphical session."
            }
        }
    }
}

impl fmt::Display for MissingDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingDependency::CameraApi => write!(f, "native camera API"),
            MissingDependency::VideoSubsystem(reason) => {
                write!(f, "SDL video subsystem ({})", reason)
            }
        }
    }
}

/// Initialized SDL, ready to open the mirror window.
pub struct Runtime {
    pub sdl: sdl2::Sdl,
    /// Held so the video subsystem stays up until the window opens
    pub video: sdl2::VideoSubsystem,
}

/// Probe the camera API and initialize SDL video.
///
/// Returns every missing component rather than stopping at the first.
pub fn check() -> Result<Runtime, Vec<MissingDependency>> {
    let camera_api = native::is_available();
    let runtime = sdl2::init().and_then(|sdl| {
        let video = sdl.video()?;
        Ok(Runtime { sdl, video })
    });

    let missing = collect_missing(
        camera_api,
        runtime.as_ref().map(|_| ()).map_err(Clone::clone),
    );
    match runtime {
        Ok(runtime) if missing.is_empty() => Ok(runtime),
        _ => Err(missing),
    }
}

/// Turn probe results into the list of missing components.
pub fn collect_missing(camera_api: bool, video: Result<(), String>) -> Vec<MissingDependency> {
    let mut missing = Vec::new();
    if !camera_api {
        missing.push(MissingDependency::CameraApi);
    }
    if let Err(reason) = video {
        missing.push(MissingDependency::VideoSubsystem(reason));
    }
    missing
}

/// Text of the blocking "Missing Dependencies" dialog.
pub fn missing_dependencies_message(missing: &[MissingDependency]) -> String {
    let mut msg = String::from("Missing Required Libraries!\n\n");
    msg.push_str("The following components are not available:\n");
    for dep in missing {
        msg.push_str(&format!("  • {}\n", dep));
    }
    msg.push('\n');
    for dep in missing {
        msg.push_str(dep.hint());
        msg.push('\n');
    }
    msg
}
