//! Stateful RDS group decoder.
//!
//! Each RDS group is four 16-bit blocks. Block A carries the program
//! identifier; block B carries the group type, version flag, and program
//! type code plus a few group-specific payload bits; blocks C and D carry
//! the payload. The decoder accumulates groups over time:
//!
//! - group 0A/0B: program service name, 2 characters per group across 4
//!   segments, confirmed only after a repeated transmission matches
//! - group 2A: radio text, 4 characters per group across 16 segments,
//!   restarted whenever the A/B alternation flag flips
//! - group 4A: clock time and date
//!
//! The decoder is pure state-machine logic with no I/O; the driver feeds
//! it groups from the RDS registers and drains the `take_*` flags to
//! decide what to publish.

use tracing::trace;

const NAME_LEN: usize = 8;
const TEXT_LEN: usize = 64;
const NUL: u8 = 0x00;

/// Accumulates RDS groups into station name, radio text, and clock time.
///
/// One decoder instance corresponds to one tuned station: the driver
/// creates a fresh decoder at power-on and after every retune so stale
/// text never survives a frequency change.
#[derive(Debug)]
pub struct RdsDecoder {
    program_identifier: u16,
    program_type: u8,

    // Station name double buffer: a segment's characters land in the
    // candidate row first and are promoted to the confirmed row only when
    // the next transmission of that segment matches.
    ps_candidate: [u8; NAME_LEN],
    ps_confirmed: [u8; NAME_LEN],
    program_name: String,

    text_buf: [u8; TEXT_LEN],
    ab_flag: u16,
    radio_text: String,

    clock_minutes: Option<i32>,

    text_updated: bool,
    time_updated: bool,
}

impl Default for RdsDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl RdsDecoder {
    pub fn new() -> Self {
        RdsDecoder {
            program_identifier: 0,
            program_type: 0,
            ps_candidate: [NUL; NAME_LEN],
            ps_confirmed: [NUL; NAME_LEN],
            program_name: String::new(),
            text_buf: [NUL; TEXT_LEN],
            ab_flag: 0,
            radio_text: String::new(),
            clock_minutes: None,
            text_updated: false,
            time_updated: false,
        }
    }

    /// Feed one RDS group (blocks A through D).
    ///
    /// The program identifier and program type are taken from every group;
    /// the payload is dispatched on the group type code.
    pub fn process_group(&mut self, a: u16, b: u16, c: u16, d: u16) {
        // Group code as conventionally written: type nibble plus version
        // letter, e.g. 0x2A for "2A" (version bit set turns A into B).
        let group_code = 0x0A | ((b & 0xF000) >> 8) | ((b & 0x0800) >> 11);

        self.program_identifier = a;
        self.program_type = ((b >> 6) & 0x1F) as u8;

        trace!(group_code, pi = a, "rds group");

        match group_code {
            0x0A | 0x0B => self.process_program_name(b, d),
            0x2A => self.process_radio_text(b, c, d),
            0x4A => self.process_clock(c, d),
            _ => {}
        }
    }

    fn process_program_name(&mut self, b: u16, d: u16) {
        let idx = (2 * (b & 0x0003)) as usize;
        let c1 = (d >> 8) as u8;
        let c2 = (d & 0x00FF) as u8;

        if c1 == self.ps_candidate[idx] && c2 == self.ps_candidate[idx + 1] {
            // Matched the previous transmission of this segment.
            self.ps_confirmed[idx] = c1;
            self.ps_confirmed[idx + 1] = c2;
        } else {
            self.ps_confirmed[idx] = NUL;
            self.ps_confirmed[idx + 1] = NUL;
        }
        self.ps_candidate[idx] = c1;
        self.ps_candidate[idx + 1] = c2;

        if self.ps_confirmed.iter().all(|&ch| ch != NUL) {
            let name: String = self.ps_confirmed.iter().map(|&ch| ch as char).collect();
            if name != self.program_name {
                trace!(%name, "station name confirmed");
                self.program_name = name;
                self.text_updated = true;
            }
        }
    }

    fn process_radio_text(&mut self, b: u16, c: u16, d: u16) {
        let ab_flag = b & 0x0010;
        let idx = (4 * (b & 0x000F)) as usize;

        if ab_flag != self.ab_flag {
            // The station started a new message.
            self.text_buf = [NUL; TEXT_LEN];
            self.ab_flag = ab_flag;
        }

        self.text_buf[idx] = (c >> 8) as u8;
        self.text_buf[idx + 1] = (c & 0x00FF) as u8;
        self.text_buf[idx + 2] = (d >> 8) as u8;
        self.text_buf[idx + 3] = (d & 0x00FF) as u8;

        // A message ends at a carriage return, or is space-padded to
        // exactly 32 or 64 characters. A NUL anywhere else means segments
        // are still missing.
        let mut complete = true;
        let mut end = TEXT_LEN;
        for (i, &ch) in self.text_buf.iter().enumerate() {
            if ch == b'\r' {
                end = i;
                break;
            }
            if ch == NUL {
                if i != 32 {
                    complete = false;
                }
                end = i;
                break;
            }
        }

        if complete {
            let text: String = self.text_buf[..end].iter().map(|&ch| ch as char).collect();
            if text != self.radio_text {
                trace!(%text, "radio text complete");
                self.radio_text = text;
                self.text_updated = true;
            }
        }
    }

    fn process_clock(&mut self, c: u16, d: u16) {
        let offset = (d & 0x3F) as i32;
        let hours = ((((c & 0x0001) << 4) | ((d >> 12) & 0x0F)) as i32) & 0x1F;
        let mut minutes = ((d >> 6) & 0x3F) as i32 + 60 * hours;

        // The offset is a signed count of half-hours from UTC.
        if offset & 0x20 != 0 {
            minutes -= 30 * (offset & 0x1F);
        } else {
            minutes += 30 * (offset & 0x1F);
        }

        self.clock_minutes = Some(minutes);
        self.time_updated = true;
    }

    pub fn program_identifier(&self) -> u16 {
        self.program_identifier
    }

    pub fn program_type(&self) -> u8 {
        self.program_type
    }

    /// Confirmed station name, empty until 4 matching segment repeats.
    pub fn program_name(&self) -> &str {
        &self.program_name
    }

    /// Last complete radio text message, empty until one assembles.
    pub fn radio_text(&self) -> &str {
        &self.radio_text
    }

    /// Decoded local time in minutes after midnight, if a clock group
    /// has been received. May be negative near midnight with a negative
    /// UTC offset.
    pub fn clock_minutes(&self) -> Option<i32> {
        self.clock_minutes
    }

    /// Whether the station name or radio text changed since the last call.
    pub fn take_text_updated(&mut self) -> bool {
        std::mem::take(&mut self.text_updated)
    }

    /// Whether a clock group arrived since the last call.
    pub fn take_time_updated(&mut self) -> bool {
        std::mem::take(&mut self.time_updated)
    }
}
