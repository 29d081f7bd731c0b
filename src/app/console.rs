// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::fmt;
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::Duration;

use indexmap::IndexMap;
use yansi::Paint;

use crate::app::output::styles::{
    self, attention_prefix, caption_prefix, error_prefix, finished_prefix, info_prefix, itemization_prefix, ok_prefix,
};
use crate::app::AppConfig;
use crate::pipeline::{PipelineOpts, RunStats};
use crate::resolver::ResolverOpts;

#[derive(Debug, Default, Clone)]
pub struct ConsoleOpts {
    quiet: bool,
    show_errors: bool,
}

impl ConsoleOpts {
    pub fn with_quiet(self, quiet: bool) -> ConsoleOpts {
        ConsoleOpts { quiet, ..self }
    }

    pub fn with_show_errors(self, show_errors: bool) -> ConsoleOpts {
        ConsoleOpts { show_errors, ..self }
    }
}

impl From<&AppConfig> for ConsoleOpts {
    fn from(app_config: &AppConfig) -> Self {
        ConsoleOpts {
            quiet: app_config.quiet,
            show_errors: false,
        }
    }
}

/// Prints messages to stdout, or to another writer, and errors to stderr.
pub struct Console {
    opts: ConsoleOpts,
    out: Mutex<Box<dyn Write + Send>>,
}

impl Console {
    pub fn new(opts: ConsoleOpts) -> Console {
        Console::with_writer(opts, io::stdout())
    }

    pub fn with_writer<W: Write + Send + 'static>(opts: ConsoleOpts, writer: W) -> Console {
        Console {
            opts,
            out: Mutex::new(Box::new(writer)),
        }
    }

    fn println(&self, line: fmt::Arguments) {
        // A poisoned lock only means another print panicked; the writer is still usable.
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(err) = writeln!(out, "{}", line) {
            tracing::debug!("Failed to print to console: {}", err);
        }
    }

    pub fn print_opts(&self, opts: &PipelineOpts, resolver_opts: &ResolverOpts) {
        if self.not_quiet() {
            self.caption(format!(
                "{}: mode={}, workers={}, rate interval={}, check attempts={}, query attempts={}, timeout={}, canary={}",
                Fmt::emph("Options"),
                opts.mode,
                opts.concurrency,
                humantime::format_duration(opts.rate_interval),
                opts.check_attempts,
                opts.query_attempts,
                humantime::format_duration(resolver_opts.timeout),
                opts.canary,
            ));
        }
    }

    pub fn print_statistics(&self, stats: &RunStats, total_run_time: Duration) {
        if self.not_quiet() {
            self.info(format!(
                "Received {} results for {} nameservers within {} ms of total run time.",
                stats.results,
                stats.tasks,
                total_run_time.as_millis()
            ));
        }
    }

    pub fn print_error_counts(&self, counts: &IndexMap<String, usize>) {
        if !self.show_errors() {
            return;
        }
        self.info("Error counts");
        if counts.is_empty() {
            self.ok("No errors occurred.");
        } else {
            for (k, v) in counts.iter() {
                self.itemize(format!("Err {} occurred {} times", k, v));
            }
        }
    }

    pub fn print_finished(&self) {
        if self.not_quiet() {
            self.finished();
        }
    }

    pub fn emphasize<T: fmt::Display>(&self, item: T) {
        self.println(format_args!("{}", Fmt::emph(item)))
    }

    pub fn info<T: AsRef<str>>(&self, str: T) {
        self.println(format_args!("{} {}", info_prefix(), str.as_ref()));
    }

    pub fn attention<T: AsRef<str>>(&self, str: T) {
        self.println(format_args!("{} {}", Fmt::attention(attention_prefix()), str.as_ref()));
    }

    pub fn finished(&self) {
        self.emphasize(format!("{} Finished.", finished_prefix()));
    }

    pub fn caption<T: AsRef<str>>(&self, str: T) {
        self.emphasize(format!("{} {}", caption_prefix(), str.as_ref()));
    }

    pub fn error<T: AsRef<str>>(&self, str: T) {
        eprintln!("{} {}", Fmt::error(error_prefix()), str.as_ref());
    }

    pub fn ok<T: AsRef<str>>(&self, str: T) {
        self.println(format_args!("{} {}", Fmt::ok(ok_prefix()), str.as_ref()));
    }

    pub fn itemize<T: AsRef<str>>(&self, str: T) {
        self.println(format_args!(" {} {}", itemization_prefix(), str.as_ref()));
    }

    pub fn not_quiet(&self) -> bool {
        !self.opts.quiet
    }

    /** Check if detailed error counts should be printed
     *
     * This is true, if `quiet` is not set and `show_errors` is set.
     */
    pub fn show_errors(&self) -> bool {
        !self.opts.quiet && self.opts.show_errors
    }
}

pub struct Fmt {}

impl Fmt {
    pub fn emph<T: fmt::Display>(item: T) -> String {
        item.paint(styles::EMPH).to_string()
    }

    pub fn attention<T: fmt::Display>(item: T) -> String {
        item.paint(styles::ATTENTION).to_string()
    }

    pub fn error<T: fmt::Display>(item: T) -> String {
        item.paint(styles::ERROR).to_string()
    }

    pub fn ok<T: fmt::Display>(item: T) -> String {
        item.paint(styles::OK).to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use spectral::prelude::*;

    use super::*;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Buffer {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn quiet_suppresses_statistics_but_not_results() {
        let buffer = Buffer::default();
        let console = Console::with_writer(ConsoleOpts::default().with_quiet(true), buffer.clone());

        console.print_statistics(&RunStats { tasks: 3, results: 3 }, Duration::from_millis(10));
        console.info("Number of valid servers: 2");

        assert_that(&buffer.text()).does_not_contain("Received");
        assert_that(&buffer.text()).contains("Number of valid servers: 2");
    }

    #[test]
    fn error_counts_only_when_requested() {
        let mut counts = IndexMap::new();
        counts.insert("timeout".to_string(), 2);

        let buffer = Buffer::default();
        Console::with_writer(ConsoleOpts::default(), buffer.clone()).print_error_counts(&counts);
        assert_that(&buffer.text().is_empty()).is_true();

        let buffer = Buffer::default();
        Console::with_writer(ConsoleOpts::default().with_show_errors(true), buffer.clone()).print_error_counts(&counts);
        assert_that(&buffer.text()).contains("Err timeout occurred 2 times");
    }
}
