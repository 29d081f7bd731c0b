use clap::builder::PossibleValuesParser;
use clap::{value_parser, Arg, ArgAction, Command};

pub static SUPPORTED_RECORD_TYPES: &[&str] = &["A", "AAAA", "CNAME", "MX", "NS", "PTR", "SOA", "SRV", "TXT"];

pub static SUPPORTED_OUTPUT_FORMATS: &[&str] = &["summary", "json"];

pub static DEFAULT_INPUT: &str = "nameservers-all.csv";
pub static DEFAULT_OUTPUT: &str = "nameservers-verified.csv";

pub fn create_parser() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .disable_help_subcommand(true)
        .infer_subcommands(true)
        .args(global_args())
        .subcommand(check_subcommand())
        .subcommand(query_subcommand())
}

fn global_args() -> Vec<Arg> {
    vec![
        Arg::new("v")
            .short('v')
            .action(ArgAction::Count)
            .global(true)
            .help("Sets the level of verbosity"),
        Arg::new("quiet")
            .short('q')
            .long("quiet")
            .action(ArgAction::SetTrue)
            .global(true)
            .help("Does not print anything but results"),
        Arg::new("no-color")
            .long("no-color")
            .action(ArgAction::SetTrue)
            .global(true)
            .help("Disables colorful output"),
        Arg::new("ascii")
            .long("ascii")
            .action(ArgAction::SetTrue)
            .global(true)
            .help("Uses only ASCII compatible characters for output"),
        Arg::new("debug")
            .long("debug")
            .action(ArgAction::SetTrue)
            .global(true)
            .help("Uses debug formatting for logging -- much more verbose"),
        Arg::new("concurrency")
            .long("concurrency")
            .value_name("NUMBER")
            .value_parser(value_parser!(usize))
            .global(true)
            .help("Sets number of concurrent workers [default: 256 for check, 64 for query]"),
        Arg::new("rate-interval")
            .long("rate-interval")
            .value_name("DURATION")
            .default_value("10ms")
            .value_parser(humantime::parse_duration)
            .global(true)
            .help("Sets min. interval between any two requests of all workers"),
        Arg::new("timeout")
            .long("timeout")
            .value_name("DURATION")
            .default_value("5s")
            .value_parser(humantime::parse_duration)
            .global(true)
            .help("Sets timeout for a single request"),
        Arg::new("check-attempts")
            .long("check-attempts")
            .value_name("NUMBER")
            .default_value("5")
            .value_parser(value_parser!(usize))
            .global(true)
            .help("Sets number of attempts to resolve the canary before a nameserver is deemed invalid"),
        Arg::new("query-attempts")
            .long("query-attempts")
            .value_name("NUMBER")
            .default_value("3")
            .value_parser(value_parser!(usize))
            .global(true)
            .help("Sets number of attempts to resolve the query"),
        Arg::new("canary")
            .long("canary")
            .value_name("NAME")
            .default_value(crate::query::DEFAULT_CANARY_NAME)
            .global(true)
            .help("Sets the name every valid nameserver must resolve"),
    ]
}

fn check_subcommand() -> Command {
    Command::new("check")
        .about("Checks nameservers and writes the valid ones to a new list")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("FILE")
                .default_value(DEFAULT_INPUT)
                .help("Reads nameservers from CSV list"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .default_value(DEFAULT_OUTPUT)
                .help("Writes valid nameservers to CSV list; the file must not exist"),
        )
}

fn query_subcommand() -> Command {
    Command::new("query")
        .about("Queries all nameservers and shows the distribution of answers")
        .arg(
            Arg::new("domain name")
                .short('d')
                .long("domain")
                .value_name("NAME")
                .default_value("google.com")
                .help("Sets domain name to query"),
        )
        .arg(
            Arg::new("record type")
                .short('t')
                .long("record-type")
                .value_name("RECORD TYPE")
                .default_value("A")
                .ignore_case(true)
                .value_parser(PossibleValuesParser::new(SUPPORTED_RECORD_TYPES))
                .help("Sets record type to query"),
        )
        .arg(
            Arg::new("input")
                .short('f')
                .long("file")
                .value_name("FILE")
                .default_value(DEFAULT_INPUT)
                .help("Reads nameservers from CSV list"),
        )
        .arg(
            Arg::new("skip-check")
                .long("skip-check")
                .action(ArgAction::SetTrue)
                .help("Queries all nameservers without checking them first"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .value_name("FORMAT")
                .default_value("summary")
                .value_parser(PossibleValuesParser::new(SUPPORTED_OUTPUT_FORMATS))
                .help("Sets the output format for results"),
        )
        .arg(
            Arg::new("show-errors")
                .long("show-errors")
                .action(ArgAction::SetTrue)
                .help("Shows error counts by kind"),
        )
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use spectral::prelude::*;

    use super::*;

    #[test]
    fn parser_is_consistent() {
        create_parser().debug_assert();
    }

    #[test]
    fn check_defaults() {
        let args = create_parser().try_get_matches_from(["nscheck", "check"]).unwrap();
        let (name, args) = args.subcommand().unwrap();

        assert_that(&name).is_equal_to("check");
        assert_that(&args.get_one::<String>("input").map(String::as_str)).is_equal_to(Some(DEFAULT_INPUT));
        assert_that(&args.get_one::<String>("output").map(String::as_str)).is_equal_to(Some(DEFAULT_OUTPUT));
    }

    #[test]
    fn query_with_global_args() {
        let args = create_parser()
            .try_get_matches_from([
                "nscheck",
                "query",
                "-vv",
                "--rate-interval",
                "20ms",
                "-t",
                "aaaa",
                "--skip-check",
            ])
            .unwrap();
        let (_, query_args) = args.subcommand().unwrap();

        assert_that(&query_args.get_count("v")).is_equal_to(2);
        assert_that(&query_args.get_one::<Duration>("rate-interval").copied())
            .is_equal_to(Some(Duration::from_millis(20)));
        assert_that(&query_args.get_flag("skip-check")).is_true();
    }

    #[test]
    fn unknown_output_format_fails() {
        let res = create_parser().try_get_matches_from(["nscheck", "query", "--output", "yaml"]);

        assert_that(&res).is_err();
    }

    #[test]
    fn subcommand_is_required() {
        let res = create_parser().try_get_matches_from(["nscheck", "-v"]);

        assert_that(&res).is_err();
    }
}
