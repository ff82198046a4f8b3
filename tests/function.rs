#[macro_use]
mod common;

#[cfg(test)]
mod function {
    tests! {
        print_function in function is OK
        "<fn f>"
    }

    tests! {
        print_native in function is OK
        "<native fn>"
    }

    tests! {
        parameters in function is OK
        "6"
    }

    tests! {
        empty_body in function is OK
        "nil"
    }

    tests! {
        recursion in function is OK
        "55"
    }

    tests! {
        local_recursion in function is OK
        "2"
        "1"
    }

    tests! {
        native_clock in function is OK
        "true"
    }

    tests! {
        missing_arguments in function is ERR
        "Expected 2 arguments but got 1."
        "[line 2]"
    }

    tests! {
        extra_arguments in function is ERR
        "Expected 1 arguments but got 2."
        "[line 2]"
    }

    tests! {
        call_string in function is ERR
        "Can only call functions and classes."
        "[line 1]"
    }

    tests! {
        call_nil in function is ERR
        "Can only call functions and classes."
        "[line 1]"
    }
}
