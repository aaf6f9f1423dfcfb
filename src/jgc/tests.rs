#[cfg(test)]
mod jgc_tests {
    use crate::jgc::writer::write;
    use crate::jgc::{Instruction, Opcode, Operand, Value};

    #[test]
    fn opcode_mnemonic_roundtrips() {
        for op in [Opcode::Func, Opcode::Brge, Opcode::Excon, Opcode::Enterblock] {
            assert_eq!(Opcode::from_mnemonic(op.mnemonic()), Some(op));
        }
    }

    #[test]
    fn unknown_mnemonic_is_none() {
        assert_eq!(Opcode::from_mnemonic("NOPE"), None);
    }

    #[test]
    fn operand_parse_recognizes_integers_strings_and_derefs() {
        assert_eq!(Operand::parse("5"), Operand::Literal(Value::Int(5)));
        assert_eq!(
            Operand::parse("\"hi\""),
            Operand::Literal(Value::Str("hi".to_string()))
        );
        assert_eq!(Operand::parse("@x"), Operand::deref("x", 1));
        assert_eq!(Operand::parse("@@x"), Operand::deref("x", 2));
        assert_eq!(Operand::parse("x"), Operand::name("x"));
    }

    #[test]
    fn operand_display_reconstructs_deref_prefix() {
        assert_eq!(Operand::deref("x", 2).to_string(), "@@x");
        assert_eq!(Operand::int(5).to_string(), "5");
    }

    #[test]
    fn instruction_display_separates_label_and_opcode_lines() {
        let mut instr = Instruction::new(Opcode::Assign, vec![Operand::name("a"), Operand::int(2)]);
        instr.label = Some("main".to_string());
        assert_eq!(instr.to_string(), "main:\nASSIGN a, 2");
    }

    #[test]
    fn writer_joins_instructions_with_newlines() {
        let instructions = vec![
            Instruction::new(Opcode::Assign, vec![Operand::name("a"), Operand::int(2)]),
            Instruction::new(Opcode::Print, vec![Operand::deref("a", 1)]),
        ];
        let text = write(&instructions);
        assert_eq!(text, "ASSIGN a, 2\nPRINT @a\n");
    }
}
