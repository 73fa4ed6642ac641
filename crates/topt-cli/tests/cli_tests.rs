//! CLI argument parsing and file-format tests.
//!
//! The CLI is a binary crate, so parsing is tested on a mirror of its clap
//! structs and file handling through the library crates it calls.

// ============================================================================
// Circuit and config files
// ============================================================================

mod file_formats {
    use std::fs;

    use topt_compile::{PassManagerBuilder, TransformConfig};
    use topt_compile::passes::GadgetisationReport;
    use topt_ir::{Circuit, PhasePolyBox, QubitId};

    fn sample() -> Circuit {
        let mut circuit = Circuit::with_size("sample", 2, 0);
        circuit
            .t(QubitId(0))
            .unwrap()
            .h(QubitId(0))
            .unwrap()
            .cx(QubitId(0), QubitId(1))
            .unwrap()
            .t(QubitId(1))
            .unwrap();
        circuit
    }

    #[test]
    fn test_circuit_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.json");
        fs::write(&path, sample().to_json().unwrap()).unwrap();

        let loaded = Circuit::from_json(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_invalid_circuit_json() {
        assert!(Circuit::from_json("{\"name\": 3}").is_err());
        assert!(Circuit::from_json("not json").is_err());
    }

    #[test]
    fn test_partial_yaml_config() {
        let config: TransformConfig =
            serde_yaml_ng::from_str("pmh_section_size: 3\nancilla_register: anc\n").unwrap();
        assert_eq!(config.pmh_section_size, 3);
        assert_eq!(config.ancilla_register, "anc");
        assert_eq!(config.ancilla_bit_register, "bits");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejected_yaml_config() {
        let config: TransformConfig = serde_yaml_ng::from_str("pmh_section_size: 0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_block_file_from_circuit() {
        let mut circuit = Circuit::with_size("block", 2, 0);
        circuit
            .cx(QubitId(0), QubitId(1))
            .unwrap()
            .t(QubitId(1))
            .unwrap();
        let pbox = PhasePolyBox::from_circuit(&circuit).unwrap();
        let json = serde_json::to_string(&pbox).unwrap();
        let back: PhasePolyBox = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pbox);
        assert_eq!(back.t_count(), 1);
    }

    #[test]
    fn test_gadgetise_file_with_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.json");
        fs::write(&path, sample().to_json().unwrap()).unwrap();

        let mut circuit = Circuit::from_json(&fs::read_to_string(&path).unwrap()).unwrap();
        let config = TransformConfig {
            ancilla_register: "anc".into(),
            ..TransformConfig::default()
        };
        let (pm, mut props) = PassManagerBuilder::new()
            .with_config(config)
            .with_verification(true)
            .with_composition(true)
            .build();
        pm.run(&mut circuit, &mut props).unwrap();

        let report = props.get::<GadgetisationReport>().unwrap();
        assert_eq!(report.internal_hadamards, 1);
        assert_eq!(circuit.qubits_in_register("anc"), vec![QubitId(2)]);

        let out = dir.path().join("sample_gadgetised.json");
        fs::write(&out, circuit.to_json().unwrap()).unwrap();
        let reloaded = Circuit::from_json(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(reloaded, circuit);
    }
}

// ============================================================================
// Clap argument parsing (mirror of the binary's structs)
// ============================================================================

mod clap_parsing {
    use clap::{ArgAction, Parser, Subcommand};

    #[derive(Parser, Debug)]
    #[command(name = "topt")]
    struct TestCli {
        #[arg(short, long, action = ArgAction::Count, global = true)]
        verbose: u8,

        #[command(subcommand)]
        command: TestCommands,
    }

    #[derive(Subcommand, Debug)]
    enum TestCommands {
        Gadgetise {
            #[arg(short, long)]
            input: String,
            #[arg(short, long)]
            output: Option<String>,
            #[arg(long)]
            compose: bool,
            #[arg(long)]
            verify: bool,
            #[arg(short, long)]
            config: Option<String>,
        },
        Resynth {
            #[arg(short, long)]
            input: String,
            #[arg(long, conflicts_with = "pauli")]
            x_index: Option<u32>,
            #[arg(long)]
            pauli: Option<String>,
            #[arg(short, long)]
            output: Option<String>,
            #[arg(long)]
            verify: bool,
            #[arg(short, long)]
            config: Option<String>,
        },
        Check {
            #[arg(short, long)]
            input: String,
        },
        Version,
    }

    #[test]
    fn test_parse_gadgetise_minimal() {
        let cli = TestCli::try_parse_from(["topt", "gadgetise", "-i", "qft.json"]).unwrap();
        match cli.command {
            TestCommands::Gadgetise {
                input,
                output,
                compose,
                verify,
                config,
            } => {
                assert_eq!(input, "qft.json");
                assert!(output.is_none());
                assert!(!compose);
                assert!(!verify);
                assert!(config.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_parse_gadgetise_all_args() {
        let cli = TestCli::try_parse_from([
            "topt",
            "-vv",
            "gadgetise",
            "-i",
            "qft.json",
            "-o",
            "out.json",
            "--compose",
            "--verify",
            "-c",
            "topt.yaml",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            TestCommands::Gadgetise {
                output,
                compose,
                verify,
                config,
                ..
            } => {
                assert_eq!(output.as_deref(), Some("out.json"));
                assert!(compose);
                assert!(verify);
                assert_eq!(config.as_deref(), Some("topt.yaml"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_gadgetise_missing_input() {
        assert!(TestCli::try_parse_from(["topt", "gadgetise"]).is_err());
    }

    #[test]
    fn test_parse_resynth_x_index() {
        let cli =
            TestCli::try_parse_from(["topt", "resynth", "-i", "u.json", "--x-index", "2"]).unwrap();
        match cli.command {
            TestCommands::Resynth {
                x_index, pauli, ..
            } => {
                assert_eq!(x_index, Some(2));
                assert!(pauli.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_resynth_pauli_conflicts_with_x_index() {
        let result = TestCli::try_parse_from([
            "topt", "resynth", "-i", "u.json", "--x-index", "0", "--pauli", "XZ",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_resynth_rejects_negative_index() {
        let result = TestCli::try_parse_from(["topt", "resynth", "-i", "u.json", "--x-index", "-1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_check_and_version() {
        let cli = TestCli::try_parse_from(["topt", "check", "-i", "c.json"]).unwrap();
        assert!(matches!(cli.command, TestCommands::Check { .. }));
        let cli = TestCli::try_parse_from(["topt", "version"]).unwrap();
        assert!(matches!(cli.command, TestCommands::Version));
    }

    #[test]
    fn test_parse_unknown_subcommand() {
        assert!(TestCli::try_parse_from(["topt", "compile", "-i", "c.json"]).is_err());
    }
}
