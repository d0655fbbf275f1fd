//! # Wire Enumerations
//!
//! Every enumerated field carried in an ADCS payload. Conversions from raw wire values are
//! checked; an out-of-range value is a codec error, never a silent default.

wire_enum! {
    /// Main loop run mode
    RunMode {
        Off = 0,
        Enabled = 1,
        Triggered = 2,
        Simulation = 3,
    }
}

wire_enum! {
    /// Cause of the last processor reset
    ResetCause {
        PowerOn = 0,
        BrownOutRegulated = 1,
        BrownOutUnregulated = 2,
        ExternalWatchdog = 3,
        External = 4,
        Watchdog = 5,
        LockupSystem = 6,
        Lockup = 7,
        SystemRequest = 8,
        BackupBrownOut = 9,
        BackupMode = 10,
        BackupModeAndBackupBrownOutRegulated = 11,
        BackupModeAndBackupBrownOutRegulatedAndBrownOutRegulated = 12,
        BackupModeAndWatchdog = 13,
        BackupBrownOutBuvinAndSystemRequest = 14,
        Unknown = 15,
    }
}

wire_enum! {
    /// Why the bootloader started the running program
    BootCause {
        Unexpected = 0,
        NotUsed1 = 1,
        CommsTimeout = 2,
        Commanded = 3,
        NotUsed2 = 4,
        SramLatchup = 5,
    }
}

wire_enum! {
    RunningProgram {
        Adcs = 1,
        Bootloader = 2,
    }
}

wire_enum! {
    /// Attitude control mode
    ControlMode {
        None = 0,
        Detumbling = 1,
        YThomsonSpin = 2,
        YWheelMomentumInitialPitchAcquisition = 3,
        YWheelMomentumSteadyState = 4,
        XyzWheel = 5,
        RwheelSunTracking = 6,
        RwheelTargetTracking = 7,
        VeryFastSpinDetumbling = 8,
        FastSpinDetumbling = 9,
        UserSpecific1 = 10,
        UserSpecific2 = 11,
        StopRWheels = 12,
        UserCoded = 13,
        SunTrackingYawOrRollOnlyWheel = 14,
        TargetTrackingYawOnlyWheel = 15,
    }
}

wire_enum! {
    /// Attitude estimation mode
    EstimationMode {
        None = 0,
        MemsRateSensing = 1,
        MagnetometerRateFilter = 2,
        MagnetometerRateFilterWithPitch = 3,
        MagnetometerAndFineSunTriad = 4,
        FullStateEkf = 5,
        MemsGyroEkf = 6,
        UserCoded = 7,
    }
}

wire_enum! {
    /// Power switch selection for one peripheral
    PowerSelect {
        Off = 0,
        On = 1,
        /// Keep the current state
        Same = 2,
    }
}

wire_enum! {
    MagnetometerMode {
        MainSignal = 0,
        RedundantSignal = 1,
        MainMotor = 2,
        None = 3,
    }
}

wire_enum! {
    Asgp4Filter {
        Lowpass = 0,
        Average = 1,
    }
}

wire_enum! {
    /// Augmented SGP4 propagator mode
    Asgp4Mode {
        Off = 0,
        Trigger = 1,
        Background = 2,
        Augment = 3,
    }
}

wire_enum! {
    /// Body axis a rate gyro is mounted along
    AxisSelect {
        PositiveX = 0,
        NegativeX = 1,
        PositiveY = 2,
        NegativeY = 3,
        PositiveZ = 4,
        NegativeZ = 5,
        NotUsed = 6,
    }
}

wire_enum! {
    CaptureResult {
        Startup = 0,
        Pending = 1,
        Success = 2,
        SuccessShift = 3,
        Timeout = 4,
        SramError = 5,
    }
}

wire_enum! {
    DetectResult {
        Startup = 0,
        NoDetect = 1,
        Pending = 2,
        TooManyEdges = 3,
        TooFewEdges = 4,
        BadFit = 5,
        SunNotFound = 6,
        Success = 7,
    }
}

wire_enum! {
    GpsSolutionStatus {
        SolutionComputed = 0,
        InsufficientObservations = 1,
        NoConvergence = 2,
        SingularityAtParametersMatrix = 3,
        CovarianceTraceExceedsMaximum = 4,
        NotYetConvergedFromColdStart = 5,
        HeightOrVelocityLimitsExceeded = 6,
        VarianceExceedsLimits = 7,
        LargeResiduals = 8,
        CalculatingComparisonToUserProvided = 9,
        FixedPositionInvalid = 10,
        PositionTypeUnauthorized = 11,
    }
}

wire_enum! {
    /// Type of a file on the ADCS SD card
    FileType {
        TelemetryLog = 2,
        JpgImage = 3,
        BmpImage = 4,
        Index = 15,
    }
}

wire_enum! {
    /// Where the ACP main loop currently is
    ExecutionPoint {
        BusyInit = 0,
        Idle = 1,
        SensorComms = 2,
        AdcsUpdate = 3,
        PeripheralPower = 4,
        CpuTemp = 5,
        ImageDownload = 6,
        ImageCompression = 7,
        SavingImage = 8,
        Logging = 9,
        LogCompression = 10,
        SavingLog = 11,
        WritingFlash = 12,
    }
}

wire_enum! {
    CameraSelect {
        Cam1 = 0,
        Cam2 = 1,
        Star = 2,
    }
}

wire_enum! {
    /// Saved image resolution
    ImageSize {
        Size1024 = 0,
        Size512 = 1,
        Size256 = 2,
        Size128 = 3,
        Size64 = 4,
    }
}

wire_enum! {
    SdLogDestination {
        PrimarySd = 0,
        SecondarySd = 1,
    }
}
