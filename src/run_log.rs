//! # Run log
//!
//! Herein is a small append-only log of run outcomes. Lines are buffered in
//! memory, mirrored to the [`log`] facade, and appended to the file on
//! [`flush`](RunLog::flush). Earlier content of the file is never rewritten,
//! so many runs can share one log.

use std::{
	collections::VecDeque,
	fs::{File, OpenOptions},
	io::{self, Write},
	path::Path
};

use log::{info, warn};

/// An append-only run log. The sink is normally a file opened for appending.
#[derive(Debug)]
pub struct RunLog<W: Write = File>
{
	/// The destination of the lines.
	sink: W,

	/// The lines not yet written, oldest first.
	pending: VecDeque<String>
}

impl RunLog<File>
{
	/// Open the run log at the given path, creating the file if necessary.
	///
	/// # Arguments
	///
	/// * `path` - The path of the log file.
	///
	/// # Returns
	///
	/// The run log.
	///
	/// # Errors
	///
	/// If the file cannot be opened for appending, an error is returned.
	pub fn open<T: AsRef<Path>>(path: T) -> Result<Self, io::Error>
	{
		let file = OpenOptions::new().create(true).append(true).open(path)?;
		Ok(Self::new(file))
	}
}

impl<W: Write> RunLog<W>
{
	/// Construct a run log that appends to the given sink.
	#[inline]
	pub fn new(sink: W) -> Self
	{
		Self { sink, pending: VecDeque::new() }
	}

	/// Get the sink.
	#[inline]
	pub fn get_mut(&mut self) -> &mut W { &mut self.sink }

	/// Count the lines not yet written.
	#[inline]
	#[must_use]
	pub fn pending(&self) -> usize { self.pending.len() }

	/// Record a line. The line is echoed at `info` level immediately, but only
	/// reaches the sink on the next [`flush`](Self::flush).
	///
	/// # Arguments
	///
	/// * `line` - The line, without a trailing newline.
	pub fn log<T: Into<String>>(&mut self, line: T)
	{
		let line = line.into();
		info!("{}", line);
		self.pending.push_back(line);
	}

	/// Append every pending line to the sink, in order. Each line leaves the
	/// queue as soon as it is written, so a later flush never repeats it.
	///
	/// # Errors
	///
	/// If a line cannot be written, an error is returned. That line and every
	/// line after it remain pending.
	pub fn flush(&mut self) -> Result<(), io::Error>
	{
		while let Some(line) = self.pending.front()
		{
			self.sink.write_all(format!("{}\n", line).as_bytes())?;
			self.pending.pop_front();
		}
		self.sink.flush()
	}
}

impl<W: Write> Drop for RunLog<W>
{
	fn drop(&mut self)
	{
		if let Err(e) = self.flush()
		{
			warn!(
				"Failed to flush run log ({} lines lost): {}",
				self.pending(),
				e
			);
		}
	}
}

////////////////////////////////////////////////////////////////////////////////
//                                   Tests.                                   //
////////////////////////////////////////////////////////////////////////////////
