use microjava::bytecode::ObjectFile;
use microjava::compile;
use microjava::runtime::{BufferIo, RuntimeError, Trap, Vm, VmConfig};

fn compile_ok(src: &str) -> ObjectFile {
    match compile(src) {
        Ok(out) => out.object,
        Err(failure) => panic!("compilation failed:\n{}", failure.diagnostics),
    }
}

fn run_with(obj: &ObjectFile, input: &str) -> (Result<(), RuntimeError>, String) {
    let config = VmConfig {
        max_steps: Some(50_000_000),
        ..VmConfig::default()
    };
    let mut vm = Vm::with_config(obj, config);
    let mut io = BufferIo::new(input);
    let result = vm.run(&mut io);
    (result, io.into_output())
}

fn run(src: &str, input: &str) -> String {
    let (result, output) = run_with(&compile_ok(src), input);
    if let Err(e) = result {
        panic!("{}\noutput so far: {:?}", e, output);
    }
    output
}

/// Runs `src` once per `(input, expected output)` pair.
fn assert_runs(src: &str, runs: &[(&str, &str)]) {
    let obj = compile_ok(src);
    for (input, expected) in runs {
        let (result, output) = run_with(&obj, input);
        assert!(result.is_ok(), "input {:?}: {}", input, result.unwrap_err());
        assert_eq!(&output, expected, "input {:?}", input);
    }
}

fn run_trap(src: &str, input: &str) -> (RuntimeError, String) {
    let (result, output) = run_with(&compile_ok(src), input);
    match result {
        Ok(()) => panic!("expected a trap, got output {:?}", output),
        Err(e) => (e, output),
    }
}

const EXAMPLE_HEADER: &str = "program A
  final int max = 12;
  char c; int i;
  class B { int x, y; }
{
  void main ()
    int[] iarr; B b; int n; int sum;
  {
";

fn example(body: &str) -> String {
    format!("{}{}\n  }}\n}}", EXAMPLE_HEADER, body)
}

#[test]
fn test_if() {
    assert_runs(
        &example("read(i); if (i <= n) n = 1; print(n);"),
        &[("0", "1"), ("1", "0")],
    );
}

#[test]
fn test_and_condition() {
    assert_runs(
        &example("read(i); n = 1; if (i <= n && n < 0) n = 2; print(n);"),
        &[("0", "1"), ("2", "1")],
    );
}

#[test]
fn test_or_condition() {
    assert_runs(
        &example("read(i); n = 1; if (i <= n || i < 10) n = 2; print(n);"),
        &[("0", "2"), ("2", "2"), ("20", "1")],
    );
}

#[test]
fn test_mixed_condition() {
    assert_runs(
        &example("read(i); n = 1; if (i <= n || i < 10 && i > 5) n = 2; print(n);"),
        &[("0", "2"), ("2", "1"), ("6", "2"), ("20", "1")],
    );
}

#[test]
fn test_while() {
    assert_runs(
        &example("read(n); while (i <= n) { i++; } print(i);"),
        &[("0", "1"), ("-1", "0"), ("1", "2"), ("10", "11")],
    );
}

#[test]
fn test_if_else_with_constant() {
    assert_runs(
        &example("read(i); if (i <= max) n = 1; else n = 2; print(n);"),
        &[("0", "1"), ("13", "2"), ("12", "1"), ("-13", "1")],
    );
}

#[test]
fn test_sum_loop() {
    assert_runs(
        &example("read(n); sum = 0; i = 2; while (i <= n) { sum += i; i++; } print(sum);"),
        &[("0", "0"), ("1", "0"), ("10", "54")],
    );
}

#[test]
fn test_method_calls() {
    let src = "program A {
  void bar() { print('b'); print('a'); print('r'); }
  void foo() { print('f'); print('o'); print('o'); }
  void main () { foo(); }
}";
    assert_eq!(run(src, ""), "foo");
}

#[test]
fn test_fib() {
    let src = "program A {
  int fib(int n) {
    if (n <= 1) return 1;
    return fib(n-1) + fib(n-2);
  }
  void main () int n; {
    read(n);
    print(fib(n));
  }
}";
    assert_runs(
        src,
        &[("-1", "1"), ("0", "1"), ("2", "2"), ("5", "8"), ("10", "89"), ("22", "28657")],
    );
}

#[test]
fn test_fib_memoized() {
    let src = "program A
  int[] matrix;
{
  int fib(int n) int r; {
    if (n <= 1) return 1;
    if (matrix[n] != 0) return matrix[n];
    r = fib(n-1) + fib(n-2);
    matrix[n] = r;
    return r;
  }
  void main () int n; {
    matrix = new int[1000];
    read(n);
    print(fib(n));
  }
}";
    assert_runs(src, &[("30", "1346269"), ("45", "1836311903")]);
}

#[test]
fn test_else_if() {
    let src = "program Test {
  void main() int i; {
    read(i);
    if (i == 1) print(9);
    else if (i == 2) print(8);
    else print(7);
  }
}";
    assert_runs(src, &[("1", "9"), ("2", "8"), ("3", "7")]);
}

#[test]
fn test_break() {
    let src = "program A
  int i;
{
  void main () int n; {
    read(n);
    while (i <= n) { while (1 < 2) { if (1 == 1) { break; } } if (i == 5) break; i++; }
    print(i);
  }
}";
    assert_eq!(run(src, "10"), "5");
}

#[test]
fn test_relational_operators() {
    let src = "program R {
  void main() int i; {
    read(i);
    if (i == 1) print('='); if (i != 1) print('!');
    if (i < 1) print('<');  if (i <= 1) print('l');
    if (i > 1) print('>');  if (i >= 1) print('g');
  }
}";
    assert_runs(src, &[("0", "!<l"), ("1", "=lg"), ("2", "!>g")]);
}

#[test]
fn test_builtins() {
    let len = "program A
  class C { int x; }
{
  void main () C[] c; {
    c = new C[5];
    print(len(c));
  }
}";
    assert_eq!(run(len, ""), "5");

    let ord_chr = "program Test {
  void main() int i; char c; {
    i = ord('A'); print(i);
    i = ord('*'); print(i);
    c = chr(49); print(c);
    ord('!');
    chr(42);
  }
}";
    assert_eq!(run(ord_chr, ""), "65421");
}

#[test]
fn test_user_method_shadows_builtin() {
    let src = "program Test {
  int cast(char c) { return ord(c); }
  int ord(char c) { return cast(c) - 30; }
  void main() {
    print(chr(ord('A')));
  }
}";
    assert_eq!(run(src, ""), "#");
}

#[test]
fn test_unused_return_value_is_popped() {
    let src = "program Test {
  int getUnused() { return 351; }
  int polluteAndGet() { getUnused(); return 42; }
  void main() { print(932 + polluteAndGet()); }
}";
    assert_eq!(run(src, ""), "974");
}

#[test]
fn test_negative_constants() {
    let src = "program A {
  void main () int neg; {
    neg = -42;
    if (neg == -42) print(42);
    else print(neg);
    print(-neg / 5 % 3, 3);
  }
}";
    assert_eq!(run(src, ""), "42  2");
}

#[test]
fn test_read_and_print() {
    let src = "program P {
  void main() int n; char c; {
    read(n);
    print(n - 1);
    read(c);
    print(c, 3);
  }
}";
    assert_eq!(run(src, "5 x"), "4  x");
    assert_eq!(run(src, ""), "-1  \u{0}");
}

#[test]
fn test_short_circuit_evaluation() {
    let src = "program S
  int calls;
{
  int t() { calls++; return 1; }
  void main() {
    if (0 == 1 && t() == 1) print(1);
    if (1 == 1 || t() == 1) print(2);
    if (t() == 0 || t() == 1) print(3);
    print(calls);
  }
}";
    assert_eq!(run(src, ""), "232");
}

#[test]
fn test_compound_assignment_evaluates_index_once() {
    let src = "program C
  int calls;
  int[] a;
{
  int f() { calls++; return 1; }
  void main() {
    a = new int[3];
    a[f()] += 5;
    a[f()] *= 2;
    a[f()]++;
    print(a[1]);
    print(calls, 2);
  }
}";
    assert_eq!(run(src, ""), "11 3");
}

#[test]
fn test_index_from_end() {
    let call = "program Test
  final int len = 2;
{
  int const1() { return 1; }
  void main() int[] a; {
    a = new int[len];
    a[0] = 13;
    a[~const1()] = 42;
    print(a[~const1()]);
    print(a[~2]);
  }
}";
    assert_eq!(run(call, ""), "4213");

    let iterate = "program Test
  final int len = 3;
{
  void main() int[] a; int i; {
    a = new int[len];
    a[0] = 1; a[1] = 2; a[2] = 3;
    i = 1;
    while (i <= len) { print(a[~i]); i++; }
  }
}";
    assert_eq!(run(iterate, ""), "321");
}

#[test]
fn test_palindrome() {
    let src = "program Test {
  void toPalindrom(char[] in, char[] out) int i, l; {
    l = len(in);
    i = 0;
    while (i < l) {
      out[i] = in[i];
      out[~(i + 1)] = in[i];
      i++;
    }
  }

  void printText(char[] text) int i; {
    i = 0;
    while (i < len(text)) { print(text[i]); i++; }
  }

  void main() char[] a, out; {
    a = new char[5];
    a[0] = 'l'; a[1] = 'a'; a[2] = 'g'; a[3] = 'e'; a[4] = 'r';
    out = new char[10];
    toPalindrom(a, out);
    printText(out);

    a = new char[2];
    a[0] = 'o'; a[1] = 't';
    out = new char[4];
    toPalindrom(a, out);
    printText(out);
  }
}";
    assert_eq!(run(src, ""), "lagerregalotto");
}

#[test]
fn test_objects_and_fields() {
    let src = "program L
  class Node { int val; Node next; }
  Node head;
{
  void push(int v) Node n; {
    n = new Node;
    n.val = v;
    n.next = head;
    head = n;
  }
  void main() Node p; int i; {
    i = 1;
    while (i <= 4) { push(i * i); i++; }
    p = head;
    while (p != null) { print(p.val, 3); p = p.next; }
    head.val += 100;
    head.next.val--;
    print(head.val, 4);
    print(head.next.val, 3);
  }
}";
    assert_eq!(run(src, ""), " 16  9  4  1 116  8");
}

#[test]
fn test_char_arrays_pack_bytes() {
    let src = "program B {
  void main() char[] s; int i; {
    s = new char[6];
    i = 0;
    while (i < len(s)) { s[i] = chr(ord('a') + i); i++; }
    s[~1] = 'Z';
    i = 0;
    while (i < len(s)) { print(s[i]); i++; }
  }
}";
    assert_eq!(run(src, ""), "abcdeZ");
}

#[test]
fn test_shadowing_between_scopes() {
    let src = "program S
  int x;
{
  void f() int x; { x = 2; print(x); }
  void main() { x = 1; f(); print(x); }
}";
    assert_eq!(run(src, ""), "21");
}

// =============================================================================
// Traps
// =============================================================================

#[test]
fn test_index_out_of_bounds_traps() {
    let src = "program T {
  void main() int[] a; {
    a = new int[3];
    print(1);
    a[~0] = 1;
    print(2);
  }
}";
    let (err, output) = run_trap(src, "");
    assert_eq!(err.trap, Trap::IndexOutOfBounds);
    assert_eq!(output, "1");

    let negative = "program T { void main() int[] a; { a = new int[3]; print(a[-1]); } }";
    assert_eq!(run_trap(negative, "").0.trap, Trap::IndexOutOfBounds);
}

#[test]
fn test_negative_array_size_traps() {
    let src = "program T
  class C { int x; }
{
  void main() int[] a; C c; {
    print(1);
    a = new int[-3];
    c = new C;
    c.x = 100;
    print(len(a));
  }
}";
    let (err, output) = run_trap(src, "");
    assert_eq!(err.trap, Trap::NegativeArraySize(-3));
    assert_eq!(output, "1");
}

#[test]
fn test_division_by_zero_traps() {
    let src = "program T { void main() int z; { print(10 / z); } }";
    let (err, _) = run_trap(src, "");
    assert_eq!(err.trap, Trap::DivisionByZero);
    assert!(err.to_string().contains("division by zero"));
}

#[test]
fn test_null_reference_traps() {
    let src = "program T
  class C { int v; }
{
  void main() C c; int[] a; { print(c.v); }
}";
    assert_eq!(run_trap(src, "").0.trap, Trap::NullReference);

    let arr = "program T { void main() int[] a; { print(len(a)); } }";
    assert_eq!(run_trap(arr, "").0.trap, Trap::NullReference);
}

#[test]
fn test_missing_return_traps() {
    let src = "program T {
  int f() { print(7 * 7); }
  void main() int i; { i = f(); }
}";
    let (err, output) = run_trap(src, "");
    assert_eq!(err.trap, Trap::Explicit(1));
    assert_eq!(output, "49");
    assert_eq!(err.call_stack.len(), 1);
}

#[test]
fn test_unbounded_recursion_overflows_method_stack() {
    let src = "program T { void f() { f(); } void main() { f(); } }";
    assert_eq!(run_trap(src, "").0.trap, Trap::MethodStackOverflow);
}

#[test]
fn test_heap_exhaustion() {
    let src = "program T { void main() int[] a; { while (1 == 1) a = new int[1000]; } }";
    assert_eq!(run_trap(src, "").0.trap, Trap::HeapOverflow);
}

#[test]
fn test_step_limit() {
    let obj = compile_ok("program T { void main() { while (1 == 1) ; } }");
    let config = VmConfig {
        max_steps: Some(1000),
        ..VmConfig::default()
    };
    let mut vm = Vm::with_config(&obj, config);
    let err = vm.run(&mut BufferIo::new("")).unwrap_err();
    assert_eq!(err.trap, Trap::StepLimit(1000));
}
