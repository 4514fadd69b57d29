use clap::Parser;

/// This program scores candidate matching questionnaires.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The file describing the questions, the candidates and the categories, in JSON format.
    /// For more information about the file format, read the manual of the policy_matching crate.
    #[clap(short, long, value_parser)]
    pub dataset: String,

    /// (file path) The answers of the user.
    #[clap(short, long, value_parser)]
    pub answers: String,

    /// (default json) The type of the answers file: json or csv.
    #[clap(long, value_parser)]
    pub answers_type: Option<String>,

    /// (category id, name or alias, may be repeated) The priority categories of the user. Setting this
    /// option overrides the categories that may be stored in the answers file.
    #[clap(short, long, value_parser)]
    pub priorities: Option<Vec<String>>,

    /// (candidate id) The candidate used for the alignment percentage and the alignment details.
    /// Setting this option overrides the target that may be specified in the dataset.
    #[clap(short, long, value_parser)]
    pub target: Option<String>,

    /// (useCandidateOrder or matchingPoints) How to order candidates with the same percentage.
    #[clap(long, value_parser)]
    pub tiebreak: Option<String>,

    /// (file path, 'stdout' or empty, default stdout) Where the result is written, in JSON format. An empty
    /// value disables the output.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference file containing an expected result in JSON format. If provided, polmatch will
    /// check that the computed result matches the reference. The timestamps are not compared.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
