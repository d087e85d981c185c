use std::sync::atomic::Ordering;
use std::time::Duration;

use mips_ensemble::asm::MemoryImage;
use mips_ensemble::err::Diagnostic;
use mips_ensemble::isa::{DATA_BASE, TEXT_BASE};
use mips_ensemble::parse::lex::TokenKind;
use mips_ensemble::sim::io::BufferedIO;
use mips_ensemble::sim::{execute_with_io, Outcome, SimErr, Simulator};
use mips_ensemble::{generate, lex, parse, validate};

/// Runs every checking stage and collects all diagnostics.
fn check(src: &str) -> Vec<Diagnostic> {
    let (tokens, lex_diags) = lex(src);
    let (nodes, parse_diags) = parse(src, &tokens);
    let val_diags = validate(src, &tokens, &nodes);
    lex_diags.into_iter().chain(parse_diags).chain(val_diags).collect()
}

fn messages(src: &str) -> Vec<String> {
    check(src).into_iter().map(|d| d.message).collect()
}

fn assemble(src: &str) -> MemoryImage {
    let diags = check(src);
    assert!(diags.is_empty(), "unexpected diagnostics: {diags:?}");
    let (tokens, _) = lex(src);
    let (nodes, _) = parse(src, &tokens);
    generate(src, &tokens, &nodes).unwrap()
}

#[test]
fn lossless_tokens() {
    let srcs = [
        "",
        ".text\nadd $t0, $t1, $t2",
        "main:\tli $v0, 10 # exit\r\n\tsyscall\n",
        ".data\nmsg: .asciiz \"a\\tb\\n\"\n  .word -1, 2\n",
        "lw $t0, -4($sp)\n\n\n",
        "bad $nope @ \"unclosed",
    ];
    for src in srcs {
        let (tokens, _) = lex(src);
        let last = tokens.last().unwrap();
        assert_eq!(last.kind, TokenKind::Eof);
        assert_eq!(last.start.offset, src.len());
        assert_eq!(last.end.offset, src.len());

        let rebuilt: String = tokens.iter().map(|t| t.slice(src)).collect();
        assert_eq!(rebuilt, src);
        assert!(tokens.windows(2).all(|w| w[0].end.offset == w[1].start.offset));
    }
}

#[test]
fn sections_agree() {
    assert_eq!(messages(".text\n.byte 1"), ["Data directive .byte used in code section"]);
    assert_eq!(messages(".data\nadd $t0, $t1, $t2"), ["Instruction used outside of code section"]);
    assert_eq!(messages(".data\n.byte 1\n.text\nadd $t0, $t1, $t2"), Vec::<String>::new());
}

#[test]
fn forward_and_backward_references() {
    let forward = assemble(".data\n.word target\n.text\ntarget: nop");
    let backward = assemble(".text\ntarget: nop\n.data\n.word target");
    assert_eq!(forward.mem(), backward.mem());
    assert_eq!(forward.mem().read_word(DATA_BASE).unwrap(), TEXT_BASE);

    let forward = assemble("j end\nnop\nend: nop");
    let backward = assemble("nop\nend: nop\nj end");
    assert_eq!(forward.mem().read_word(TEXT_BASE).unwrap(), 0x0810_0002);
    assert_eq!(backward.mem().read_word(TEXT_BASE + 8).unwrap(), 0x0810_0001);
}

#[test]
fn idempotent() {
    let src = ".text\nadd $t0, $t1\nsll $t0, $t1, 32\n.data\n.byte 300\nx: .word y";
    let (tokens1, d1) = lex(src);
    let (tokens2, d2) = lex(src);
    assert_eq!(tokens1, tokens2);
    assert_eq!(d1, d2);

    let (nodes1, p1) = parse(src, &tokens1);
    let (nodes2, p2) = parse(src, &tokens2);
    assert_eq!(nodes1, nodes2);
    assert_eq!(p1, p2);

    assert_eq!(validate(src, &tokens1, &nodes1), validate(src, &tokens2, &nodes2));
}

#[test]
fn data_bounds() {
    assert!(check(".data\n.byte 255, -128").is_empty());
    assert_eq!(messages(".data\n.byte 256"), ["Invalid byte value"]);
    assert_eq!(messages(".data\n.byte -129"), ["Invalid byte value"]);

    assert!(check(".data\n.half 65535, -32768").is_empty());
    assert_eq!(messages(".data\n.half 65536"), ["Invalid half value"]);
    assert_eq!(messages(".data\n.half -32769"), ["Invalid half value"]);

    assert!(check(".data\n.word 4294967295, -2147483648").is_empty());
    assert_eq!(messages(".data\n.word 4294967296"), ["Invalid word value"]);
    assert_eq!(messages(".data\n.word -2147483649"), ["Invalid word value"]);
}

#[test]
fn add_encoding() {
    let image = assemble(".text\nadd $t0, $t1, $t2");
    assert_eq!(image.mem().read_word(TEXT_BASE).unwrap(), 0x012A_4020);
}

#[test]
fn byte_data() {
    let image = assemble(".data\n.byte 42, 255, -128");
    let mem = image.mem();
    assert_eq!(mem.read_byte(DATA_BASE), 42);
    assert_eq!(mem.read_byte(DATA_BASE + 1), 255);
    assert_eq!(mem.read_byte(DATA_BASE + 2), 128);
}

#[test]
fn li_expansion() {
    let image = assemble(".text\nli $t0, 42\nli $s0, -1");
    let mem = image.mem();
    // ori $t0, $zero, 42
    assert_eq!(mem.read_word(TEXT_BASE).unwrap(), 0x3408_002A);
    // lui $s0, 0xFFFF; ori $s0, $s0, 0xFFFF
    assert_eq!(mem.read_word(TEXT_BASE + 4).unwrap(), 0x3C10_FFFF);
    assert_eq!(mem.read_word(TEXT_BASE + 8).unwrap(), 0x3610_FFFF);
    assert_eq!(image.text_range(), TEXT_BASE..TEXT_BASE + 12);
}

#[test]
fn li_sizing_keeps_labels_in_sync() {
    let image = assemble("li $t0, 100000\nafter: nop");
    assert_eq!(image.symbol_table().lookup_label("after"), Some(TEXT_BASE + 8));
}

#[test]
fn print_int() {
    let image = assemble("li $v0, 1\nli $a0, 2110\nsyscall");
    let io = BufferedIO::new();
    let summary = execute_with_io(&image, 100, io.clone()).unwrap();
    assert_eq!(io.output_string(), "2110");
    assert_eq!(summary.instructions_executed, 3);
    assert_eq!(summary.exit_code, Some(0));
}

#[test]
fn shift_amount() {
    assert_eq!(messages(".text\nsll $t0, $t1, 32"), ["Shift amount must be in range 0-31"]);
}

#[test]
fn hello_world() {
    let image = assemble(r#"
        .data
        greeting: .asciiz "Hello, world!\n"
        .text
        main:
            lui $a0, 4097
            li $v0, 4
            syscall
            li $v0, 17
            li $a0, 7
            syscall
    "#);
    let io = BufferedIO::new();
    let summary = execute_with_io(&image, 100, io.clone()).unwrap();
    assert_eq!(io.output_string(), "Hello, world!\n");
    assert_eq!(summary.outcome, Outcome::Exited(7));
    assert_eq!(summary.exit_code, Some(7));
}

#[test]
fn factorial_loop() {
    let image = assemble("
        main:
            li $v0, 5
            syscall
            move $t0, $v0
            li $t1, 1
        loop:
            blez $t0, done
            mult $t1, $t0
            mflo $t1
            addi $t0, $t0, -1
            j loop
        done:
            li $v0, 1
            move $a0, $t1
            syscall
            li $v0, 10
            syscall
    ");
    let io = BufferedIO::with_input("6\n");
    let summary = execute_with_io(&image, 1_000, io.clone()).unwrap();
    assert_eq!(io.output_string(), "720");
    assert_eq!(summary.outcome, Outcome::Exited(0));
}

#[test]
fn budget_exceeded() {
    let image = assemble("loop: j loop");
    let summary = execute_with_io(&image, 500, BufferedIO::new()).unwrap();
    assert_eq!(summary.outcome, Outcome::BudgetExceeded);
    assert_eq!(summary.exit_code, None);
    assert_eq!(summary.instructions_executed, 500);
}

#[test]
fn fault_reports_partial_count() {
    let image = assemble("li $t0, 1\nli $t1, 2\nli $v0, 42\nsyscall");
    let fault = execute_with_io(&image, 100, BufferedIO::new()).unwrap_err();
    assert_eq!(fault.error, SimErr::UnsupportedSyscall(42));
    assert_eq!(fault.instructions_executed, 3);
    assert_eq!(fault.pc, TEXT_BASE + 12);
}

#[test]
fn unimplemented_pseudo_is_fatal() {
    let src = ".data\nx: .word 0\n.text\nla $a0, x";
    assert!(check(src).is_empty());
    let (tokens, _) = lex(src);
    let (nodes, _) = parse(src, &tokens);
    let err = generate(src, &tokens, &nodes).unwrap_err();
    assert_eq!(err.to_string(), "unimplemented pseudo-instruction 'la'");
}

#[test]
fn cancel_from_other_thread() {
    let image = assemble("loop: j loop");
    let mut sim = Simulator::new(Default::default());
    sim.load(&image);

    let flag = sim.running_flag();
    let handle = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(10));
        flag.store(false, Ordering::Relaxed);
    });

    // the cancel is seen whether it lands before or during the run
    assert_eq!(sim.run().unwrap(), Outcome::Cancelled);
    handle.join().unwrap();
}

#[test]
fn jump_into_data_faults() {
    let image = assemble(".data\n.word -1\n.text\nlui $t0, 4097\njr $t0\nli $v0, 10\nsyscall");
    let fault = execute_with_io(&image, 100, BufferedIO::new()).unwrap_err();
    assert_eq!(fault.error, SimErr::IllegalOpcode(0xFFFF_FFFF));
    assert_eq!(fault.pc, DATA_BASE);
    assert_eq!(fault.instructions_executed, 2);
}
