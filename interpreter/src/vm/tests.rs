#[cfg(test)]
mod vm_tests {
    use std::collections::HashMap;
    use std::io;

    use jg_compiler::jgc::{Instruction, Opcode, Operand};

    use crate::vm::{Interpreter, Program};

    fn run(source: &str) -> String {
        let (program, diagnostics) = crate::loader::load(source);
        assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
        let mut interpreter = Interpreter::new(program);
        let mut input: std::iter::Empty<io::Result<String>> = std::iter::empty();
        let mut out = Vec::new();
        interpreter.run_with(&mut input, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn assign_and_print_round_trip_a_literal_int() {
        assert_eq!(run("main:\nLABEL __entry\nASSIGN x, 5\nPRINT @x\nRETURN\n"), "5\n");
    }

    #[test]
    fn iadd_computes_the_sum_of_two_variables() {
        let source = "main:\nLABEL __entry\nASSIGN a, 2\nASSIGN b, 3\nIADD c, @a, @b\nPRINT @c\nRETURN\n";
        assert_eq!(run(source), "5\n");
    }

    #[test]
    fn function_call_deposits_its_return_value_in_the_caller() {
        let source = "\
main:
LABEL __entry
ASSIGN n, 4
FUNC F1, result
PRINT @result
RETURN
F1:
LABEL __entry
IADD result, @n, @n
RETURN result
";
        assert_eq!(run(source), "8\n");
    }

    #[test]
    fn brle_loop_counts_down() {
        let source = "\
main:
LABEL __entry
ASSIGN c, 3
LABEL loop
BRLE @c, 0, end
PRINT @c
ISUB c, @c, 1
BR loop
LABEL end
RETURN
";
        assert_eq!(run(source), "3\n2\n1\n");
    }

    #[test]
    fn indirection_chases_through_a_string_valued_variable() {
        let source = "main:\nLABEL __entry\nASSIGN q, 9\nASSIGN p, q\nPRINT @@p\nRETURN\n";
        assert_eq!(run(source), "9\n");
    }

    #[test]
    fn object_attribute_and_retrieve_round_trip() {
        let source = "\
main:
LABEL __entry
INSERT o, Point
OBJECT o
ATTRIBUTE @o, x, 4
RETRIEVE v, @o, x
PRINT @v
RETURN
";
        assert_eq!(run(source), "4\n");
    }

    #[test]
    fn excon_runs_the_callers_attached_block_once() {
        let source = "\
main:
LABEL __entry
FUNC Fblock
ENTERBLOCK
PRINT 42
EXITBLOCK
RETURN
Fblock:
LABEL __entry
EXCON
RETURN
";
        assert_eq!(run(source), "42\n");
    }

    #[test]
    fn excon_inside_a_loop_runs_the_block_once_per_iteration() {
        let source = "\
main:
LABEL __entry
ASSIGN i, 3
FUNC Fblock
ENTERBLOCK
PRINT 9
EXITBLOCK
RETURN
Fblock:
LABEL __entry
LABEL loop
BRLE @i, 0, done
EXCON
ISUB i, @i, 1
BR loop
LABEL done
RETURN
";
        assert_eq!(run(source), "9\n9\n9\n");
    }

    #[test]
    fn running_off_the_end_of_the_program_terminates() {
        assert_eq!(run("main:\nLABEL __entry\nASSIGN x, 1\n"), "");
    }

    #[test]
    fn excon_outside_a_block_carrying_call_is_a_documented_no_op() {
        let program = Program {
            instructions: vec![
                Instruction::new(Opcode::Excon, Vec::new()),
                Instruction::new(Opcode::Print, vec![Operand::int(1)]),
                Instruction::new(Opcode::Return, Vec::new()),
            ],
            functions: HashMap::from([("main".to_string(), 0)]),
            labels: HashMap::new(),
        };
        let mut interpreter = Interpreter::new(program);
        let mut input: std::iter::Empty<io::Result<String>> = std::iter::empty();
        let mut out = Vec::new();
        interpreter.run_with(&mut input, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1\n");
    }
}
