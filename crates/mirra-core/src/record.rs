//! On-disk record formats
//!
//! - Pose frames: one JSON object per line, `{"t": 0.0, "ok": true, "kp": [[x, y, z, v], ...]}`,
//!   written with `", "` / `": "` separators so files match the extractor's output byte for byte.
//! - Angle tables: CSV with header `t,elbow_L,elbow_R,knee_L,knee_R`.

use std::io::{self, BufRead, Write};

use serde::{Deserialize, Serialize};
use serde_json::ser::Formatter;

use crate::{AngleChannel, AngleSample, LandmarkFrame, MirraError, MirraResult};

/// Angle table header
pub const ANGLE_TABLE_HEADER: &str = "t,elbow_L,elbow_R,knee_L,knee_R";

/// One sampled instant of a recorded performance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseRecord {
    pub t: f64,
    /// Whether the detector found a body
    pub ok: bool,
    /// Landmarks, empty when `ok` is false
    #[serde(default)]
    pub kp: LandmarkFrame,
}

impl PoseRecord {
    pub fn detected(t: f64, kp: LandmarkFrame) -> Self {
        Self { t, ok: true, kp }
    }

    pub fn missing(t: f64) -> Self {
        Self {
            t,
            ok: false,
            kp: LandmarkFrame::empty(),
        }
    }

    /// Landmarks if this record holds usable data
    pub fn landmarks(&self) -> Option<&LandmarkFrame> {
        if self.ok && !self.kp.is_empty() {
            Some(&self.kp)
        } else {
            None
        }
    }

    /// Serialize as a single JSON line (no trailing newline)
    pub fn to_json_line(&self) -> MirraResult<String> {
        let mut buf = Vec::with_capacity(64 + self.kp.len() * 48);
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
        self.serialize(&mut ser).map_err(io::Error::from)?;
        String::from_utf8(buf).map_err(|e| MirraError::InvalidArgument(e.to_string()))
    }
}

/// JSON formatter emitting `", "` between items, `": "` after keys and
/// floats through [`format_float`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        writer.write_all(b": ")
    }

    fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        writer.write_all(format_float(value).as_bytes())
    }
}

/// Parse one JSONL line (1-based `line` for error reporting)
pub fn parse_pose_line(text: &str, line: usize) -> MirraResult<PoseRecord> {
    serde_json::from_str(text).map_err(|e| MirraError::MalformedRecord {
        line,
        reason: e.to_string(),
    })
}

/// Read pose records, skipping blank lines
pub fn read_pose_records<R: BufRead>(reader: R) -> MirraResult<Vec<PoseRecord>> {
    let mut records = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(parse_pose_line(&line, i + 1)?);
    }
    Ok(records)
}

pub fn write_pose_records<W: Write>(mut writer: W, records: &[PoseRecord]) -> MirraResult<()> {
    for record in records {
        writer.write_all(record.to_json_line()?.as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Shortest round-trip float text in the extractor's notation
///
/// Positional form keeps a `.0` on integral values. Decimal exponents below
/// -4 or from 16 up switch to `1.2e-05` / `1e+16` form.
pub fn format_float(value: f64) -> String {
    if !value.is_finite() {
        return format!("{value}");
    }

    // `{:e}` yields the shortest round-trip digits, e.g. "1.2e-5"
    let scientific = format!("{:e}", value.abs());
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let sign = if value.is_sign_negative() { "-" } else { "" };

    if !(-4..16).contains(&exponent) {
        let exp_sign = if exponent < 0 { '-' } else { '+' };
        return format!("{sign}{mantissa}e{exp_sign}{:02}", exponent.abs());
    }

    let body = if exponent < 0 {
        format!("0.{}{digits}", "0".repeat((-exponent - 1) as usize))
    } else {
        let whole = exponent as usize + 1;
        if digits.len() <= whole {
            format!("{digits}{}.0", "0".repeat(whole - digits.len()))
        } else {
            format!("{}.{}", &digits[..whole], &digits[whole..])
        }
    };
    format!("{sign}{body}")
}

pub fn write_angle_table<W: Write>(mut writer: W, samples: &[AngleSample]) -> MirraResult<()> {
    writeln!(writer, "{ANGLE_TABLE_HEADER}")?;
    for s in samples {
        writeln!(
            writer,
            "{},{},{},{},{}",
            format_float(s.t),
            format_float(s.elbow_l),
            format_float(s.elbow_r),
            format_float(s.knee_l),
            format_float(s.knee_r),
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// Read an angle table; columns may appear in any order, extra columns are ignored
pub fn read_angle_table<R: BufRead>(reader: R) -> MirraResult<Vec<AngleSample>> {
    let mut lines = reader.lines().enumerate();

    let header = loop {
        match lines.next() {
            Some((_, line)) => {
                let line = line?;
                if !line.trim().is_empty() {
                    break line;
                }
            }
            None => return Ok(Vec::new()),
        }
    };

    let columns: Vec<&str> = header.split(',').map(str::trim).collect();
    let position = |name: &str| -> MirraResult<usize> {
        columns
            .iter()
            .position(|c| *c == name)
            .ok_or_else(|| MirraError::MalformedRecord {
                line: 1,
                reason: format!("missing column {name}"),
            })
    };

    let t_col = position("t")?;
    let mut channel_cols = [0usize; 4];
    for (slot, channel) in channel_cols.iter_mut().zip(AngleChannel::all().iter()) {
        *slot = position(channel.column())?;
    }

    let mut samples = Vec::new();
    for (i, line) in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let field = |col: usize| -> MirraResult<f64> {
            let raw = fields.get(col).ok_or_else(|| MirraError::MalformedRecord {
                line: i + 1,
                reason: format!("expected {} fields, got {}", columns.len(), fields.len()),
            })?;
            raw.parse::<f64>().map_err(|e| MirraError::MalformedRecord {
                line: i + 1,
                reason: format!("{raw:?}: {e}"),
            })
        };

        let mut sample = AngleSample::zero(field(t_col)?);
        for (col, channel) in channel_cols.iter().zip(AngleChannel::all().iter()) {
            sample.set_channel(*channel, field(*col)?);
        }
        samples.push(sample);
    }

    Ok(samples)
}
