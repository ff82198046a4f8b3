#[macro_use]
mod common;

#[cfg(test)]
mod operator {
    tests! {
        precedence in operator is OK
        "14"
        "8"
        "4"
        "true"
        "false"
        "true"
        "2"
    }

    tests! {
        comparison in operator is OK
        "true"
        "true"
        "false"
        "true"
    }

    tests! {
        equality in operator is OK
        "true"
        "false"
        "true"
        "true"
        "false"
        "false"
    }

    tests! {
        divide in operator is OK
        "4"
        "0.5"
    }

    tests! {
        not in operator is OK
        "false"
        "false"
        "false"
        "true"
    }

    tests! {
        add_strings in operator is OK
        "foobar"
    }

    tests! {
        add_mixed in operator is ERR
        "Operands must be two numbers or two strings."
        "[line 1]"
    }

    tests! {
        subtract_string in operator is ERR
        "Operands must be numbers."
        "[line 1]"
    }

    tests! {
        compare_strings in operator is ERR
        "Operands must be numbers."
        "[line 1]"
    }

    tests! {
        negate_string in operator is ERR
        "Operand must be a number."
        "[line 1]"
    }
}
