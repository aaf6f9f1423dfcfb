#[cfg(test)]
mod loader_tests {
    use crate::loader::load;
    use jg_compiler::error::DiagnosticKind;
    use jg_compiler::jgc::Opcode;

    #[test]
    fn label_line_registers_the_following_instruction_as_the_function_entry() {
        let (program, diagnostics) = load("main:\nLABEL __entry\nASSIGN x, 5\nRETURN\n");
        assert!(diagnostics.is_empty());
        assert_eq!(program.functions.get("main"), Some(&0));
        assert_eq!(program.instructions.len(), 3);
        assert_eq!(program.instructions[0].opcode, Opcode::Label);
    }

    #[test]
    fn intra_function_label_points_past_the_label_marker() {
        let (program, _) = load("main:\nLABEL __entry\nLABEL loop\nPRINT 1\nBR loop\nRETURN\n");
        let loop_target = program.labels.get("main").and_then(|scope| scope.get("loop")).copied();
        assert_eq!(loop_target, Some(2));
        assert_eq!(program.instructions[2].opcode, Opcode::Print);
    }

    #[test]
    fn unknown_opcode_is_skipped_and_diagnosed() {
        let (program, diagnostics) = load("main:\nLABEL __entry\nFROB 1, 2\nRETURN\n");
        assert_eq!(program.instructions.len(), 2);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::UnknownOpcode);
    }

    #[test]
    fn enterblock_exitblock_pairing_fills_the_preceding_instructions_contents() {
        let (program, diagnostics) = load(
            "main:\nLABEL __entry\nFUNC F1, result\nENTERBLOCK\nPRINT 1\nEXITBLOCK\nRETURN\n",
        );
        assert!(diagnostics.is_empty());
        // index 1 is FUNC, 2 ENTERBLOCK, 3 PRINT, 4 EXITBLOCK
        assert_eq!(program.instructions[1].contents, Some((3, 4)));
    }

    #[test]
    fn unmatched_exitblock_is_diagnosed() {
        let (_, diagnostics) = load("main:\nLABEL __entry\nEXITBLOCK\nRETURN\n");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::MalformedJgc);
    }

    #[test]
    fn unclosed_enterblock_is_diagnosed() {
        let (_, diagnostics) = load("main:\nLABEL __entry\nFUNC F1\nENTERBLOCK\nPRINT 1\n");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::MalformedJgc);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let (program, diagnostics) = load("main:\n\nLABEL __entry\n\nRETURN\n\n");
        assert!(diagnostics.is_empty());
        assert_eq!(program.instructions.len(), 2);
    }
}
