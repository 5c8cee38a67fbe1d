//! Run configuration.
//!
//! A [`RunConfiguration`] is built once from the command tokens and is
//! immutable afterwards. The token syntax keeps the single-dash options of the
//! original rigging tools:
//!
//! ```text
//! skelfit filename [-outdir dir] [-skel name|path] [-rot x y z deg]*
//!         [-scale s] [-meshonly|-mo] [-circlesonly|-co] [-nofit]
//!         [-algo LBS|DQS|MIX weight]
//! ```
//!
//! # Example
//!
//! ```
//! use skelfit::config::RunConfiguration;
//!
//! let tokens = ["skelfit", "model.obj", "-nofit", "-scale", "1.5"];
//! let config = RunConfiguration::from_tokens(&tokens).unwrap();
//! assert!(config.no_fit);
//! assert_eq!(config.skeleton_scale, 1.5);
//! ```

use std::path::PathBuf;
use std::str::FromStr;

use nalgebra::{UnitQuaternion, Vector3};
use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::mesh::SkinningAlgorithm;
use crate::skeleton::{Preset, Skeleton};

/// Usage banner printed for malformed invocations.
pub const USAGE: &str = "\
Usage: skelfit filename.{obj | ply | off | stl | gltf | glb}
              [-outdir dir] [-skel skelname] [-rot x y z deg]* [-scale s]
              [-meshonly | -mo] [-circlesonly | -co] [-nofit]
              [-algo skinning_algorithm [blend_weight]]";

/// Notice reported when `-skel` has no argument.
pub const NO_SKELETON_NOTICE: &str = "No skeleton specified; ignoring.";

/// Environment variable holding the exit status used for usage errors.
pub const USAGE_EXIT_CODE_VAR: &str = "SKELFIT_USAGE_EXIT_CODE";

/// Everything one run of the pipeline needs to know.
#[derive(Debug, Clone)]
pub struct RunConfiguration {
    /// Mesh file to rig.
    pub filename: PathBuf,
    /// Directory receiving `skeleton.out` and `attachment.out`.
    pub output_dir: PathBuf,
    /// Rotation applied to the mesh before normalization.
    pub mesh_transform: UnitQuaternion<f64>,
    /// User scale for the skeleton template.
    pub skeleton_scale: f64,
    /// Parsed from `-meshonly`; no stage consults it.
    pub stop_at_mesh: bool,
    /// Parsed from `-circlesonly`; no stage consults it.
    pub stop_after_circles: bool,
    /// Use the template pose directly instead of automatic fitting.
    pub no_fit: bool,
    /// Skeleton template.
    pub skeleton: Skeleton,
    /// The literal `-skel` argument, if one was given.
    pub skeleton_name: Option<String>,
    /// Requested skinning algorithm.
    pub skinning: SkinningAlgorithm,
    /// Non-fatal usage messages, in the order they arose.
    pub notices: Vec<String>,
}

impl RunConfiguration {
    /// Default configuration for `filename`.
    pub fn new<P: Into<PathBuf>>(filename: P) -> Self {
        Self {
            filename: filename.into(),
            output_dir: PathBuf::from("."),
            mesh_transform: UnitQuaternion::identity(),
            skeleton_scale: 1.0,
            stop_at_mesh: false,
            stop_after_circles: false,
            no_fit: false,
            skeleton: Skeleton::preset(Preset::Human),
            skeleton_name: None,
            skinning: SkinningAlgorithm::Lbs,
            notices: Vec::new(),
        }
    }

    /// Build a configuration from command tokens.
    ///
    /// Token 0 is the program name and token 1 the mesh filename; options
    /// follow. Tokens are consumed left to right, and every option checks
    /// that its arguments exist before reading them.
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Self, ConfigError> {
        if tokens.len() < 2 {
            return Err(ConfigError::usage("No input file given."));
        }

        let mut config = Self::new(tokens[1].as_ref());
        let mut cursor = Tokens {
            tokens,
            next: 2,
        };

        while let Some(option) = cursor.next_token() {
            match option {
                "-outdir" => {
                    let dir = cursor
                        .next_token()
                        .ok_or_else(|| ConfigError::usage("No output directory given; exiting."))?;
                    config.output_dir = PathBuf::from(dir);
                }
                "-skel" => {
                    let Some(name) = cursor.next_token() else {
                        warn!("no skeleton name after -skel");
                        config.notices.push(NO_SKELETON_NOTICE.to_string());
                        continue;
                    };
                    config.skeleton = resolve_skeleton(name)?;
                    config.skeleton_name = Some(name.to_string());
                }
                "-rot" => {
                    let args = cursor
                        .take_args(4)
                        .ok_or_else(|| ConfigError::usage("Too few rotation arguments; exiting."))?;
                    let [x, y, z, deg]: [f64; 4] = parse_numbers(args, "rotation")?;
                    config.mesh_transform = rotation(x, y, z, deg) * config.mesh_transform;
                }
                "-scale" => {
                    let value = cursor
                        .next_token()
                        .ok_or_else(|| ConfigError::usage("No scale provided; exiting."))?;
                    config.skeleton_scale = parse_number(value, "scale")?;
                }
                "-meshonly" | "-mo" => config.stop_at_mesh = true,
                "-circlesonly" | "-co" => config.stop_after_circles = true,
                "-nofit" => config.no_fit = true,
                "-algo" => {
                    let algo = cursor
                        .next_token()
                        .ok_or_else(|| ConfigError::usage("No skinning algorithm given; exiting."))?;
                    config.skinning = match algo {
                        "LBS" => SkinningAlgorithm::Lbs,
                        "DQS" => SkinningAlgorithm::Dqs,
                        "MIX" => {
                            let weight = cursor.next_token().ok_or_else(|| {
                                ConfigError::usage("No blending weight given; exiting.")
                            })?;
                            SkinningAlgorithm::Mix {
                                blend_weight: parse_number(weight, "blending weight")?,
                            }
                        }
                        other => {
                            return Err(ConfigError::usage(format!(
                                "Unrecognized skinning algorithm: {}",
                                other
                            )))
                        }
                    };
                }
                other => {
                    return Err(ConfigError::usage(format!("Unrecognized option: {}", other)));
                }
            }
        }

        debug!(
            filename = %config.filename.display(),
            output_dir = %config.output_dir.display(),
            joints = config.skeleton.joint_count(),
            skinning = config.skinning.name(),
            no_fit = config.no_fit,
            "built run configuration"
        );

        Ok(config)
    }

    /// Scale applied to the skeleton before fitting.
    pub fn fit_scale(&self) -> f64 {
        self.skeleton_scale * crate::pipeline::SKELETON_SCALE_HEURISTIC
    }
}

/// Cursor over the option tokens.
struct Tokens<'a, S> {
    tokens: &'a [S],
    next: usize,
}

impl<'a, S: AsRef<str>> Tokens<'a, S> {
    fn next_token(&mut self) -> Option<&'a str> {
        let token = self.tokens.get(self.next)?;
        self.next += 1;
        Some(token.as_ref())
    }

    /// Take exactly `n` tokens, or none if fewer remain.
    fn take_args(&mut self, n: usize) -> Option<&'a [S]> {
        let args = self.tokens.get(self.next..self.next + n)?;
        self.next += n;
        Some(args)
    }
}

fn resolve_skeleton(name: &str) -> Result<Skeleton, ConfigError> {
    match Preset::from_name(name) {
        Some(preset) => Ok(preset.build()),
        None => Skeleton::from_file(name).map_err(|source| ConfigError::Skeleton {
            name: name.to_string(),
            source,
        }),
    }
}

fn parse_number<T: FromStr>(token: &str, what: &str) -> Result<T, ConfigError> {
    token
        .parse()
        .map_err(|_| ConfigError::usage(format!("Invalid {} value: {}", what, token)))
}

fn parse_numbers<const N: usize, S: AsRef<str>>(
    tokens: &[S],
    what: &str,
) -> Result<[f64; N], ConfigError> {
    let mut out = [0.0; N];
    for (value, token) in out.iter_mut().zip(tokens) {
        *value = parse_number(token.as_ref(), what)?;
    }
    Ok(out)
}

/// Rotation of `deg` degrees about the axis `(x, y, z)`.
///
/// A zero axis yields the identity.
fn rotation(x: f64, y: f64, z: f64, deg: f64) -> UnitQuaternion<f64> {
    let axis = Vector3::new(x, y, z);
    match nalgebra::Unit::try_new(axis, f64::EPSILON) {
        Some(axis) => UnitQuaternion::from_axis_angle(&axis, deg.to_radians()),
        None => {
            warn!(x, y, z, "rotation axis has zero length; ignoring rotation");
            UnitQuaternion::identity()
        }
    }
}

/// Exit status reported for usage errors.
///
/// Malformed invocations have always exited with status 0; the
/// [`USAGE_EXIT_CODE_VAR`] environment variable overrides that with any
/// value in `0..=255`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageExitCode(pub u8);

impl Default for UsageExitCode {
    fn default() -> Self {
        UsageExitCode(0)
    }
}

impl UsageExitCode {
    /// Read the policy from the environment.
    pub fn from_env() -> Self {
        Self::from_value(std::env::var(USAGE_EXIT_CODE_VAR).ok().as_deref())
    }

    /// Interpret a raw environment value.
    ///
    /// Unset values, non-integers and integers outside `0..=255` give the
    /// default.
    pub fn from_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => Self::default(),
            Some(raw) => match raw.parse() {
                Ok(code) => UsageExitCode(code),
                Err(_) => {
                    warn!(value = raw, "ignoring invalid {}", USAGE_EXIT_CODE_VAR);
                    Self::default()
                }
            },
        }
    }
}
