#[macro_use]
mod common;

#[cfg(test)]
mod variable {
    tests! {
        shadowing in variable is OK
        "2"
        "1"
    }

    tests! {
        uninitialized in variable is OK
        "nil"
    }

    tests! {
        redefine_global in variable is OK
        "2"
    }

    tests! {
        early_bound in variable is OK
        "outer"
    }

    tests! {
        use_global_in_initializer in variable is OK
        "value"
    }

    tests! {
        undefined_global in variable is ERR
        "Undefined variable 'notDefined'."
        "[line 1]"
    }

    tests! {
        undefined_local in variable is ERR
        "Undefined variable 'notDefined'."
        "[line 2]"
    }

    tests! {
        duplicate_local in variable is ERR
        "[line 3] Error at 'a': Variable with this name already declared in this scope."
    }

    tests! {
        duplicate_parameter in variable is ERR
        "[line 1] Error at 'arg': Variable with this name already declared in this scope."
    }

    tests! {
        use_local_in_initializer in variable is ERR
        "[line 1] Error at 'a': Cannot read local variable in its own initializer."
    }

    tests! {
        use_keyword_as_name in variable is ERR
        "[line 1] Error at 'false': Expect variable name."
    }
}
